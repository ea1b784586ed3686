#![allow(dead_code)]

use chrono::Utc;
use funnelcraft::{
    Analysis, Customizations, EmailSequence, Funnel, Project, ProjectStatus, ScrapeMode, TextBy,
    analyze_page, email::fallback_sequence, fetch, generate_funnel,
};

pub const SAMPLE_URL: &str = "https://acme.example.com/offer";

pub fn customizations(brand_name: &str, num_upsells: u32, num_downsells: u32) -> Customizations {
    Customizations {
        brand_name: Some(brand_name.to_owned()),
        num_upsells: Some(num_upsells),
        num_downsells: Some(num_downsells),
        ..Customizations::default()
    }
}

pub async fn sample_analysis() -> Analysis {
    let page = fetch(SAMPLE_URL, ScrapeMode::Placeholder, TextBy::DomSmoothie)
        .await
        .expect("Placeholder fetch never fails.")
        .expect("Placeholder page is always produced.");
    analyze_page(&page, SAMPLE_URL).into_record()
}

pub async fn sample_funnel(brand_name: &str, num_upsells: u32, num_downsells: u32) -> Funnel {
    generate_funnel(
        &sample_analysis().await,
        &customizations(brand_name, num_upsells, num_downsells),
    )
}

pub fn sample_sequence(brand_name: &str) -> EmailSequence {
    let mut sequence = fallback_sequence(brand_name, "unused");
    sequence.error = None;
    sequence
}

pub fn sample_project(funnel: Option<Funnel>, email_sequence: Option<EmailSequence>) -> Project {
    Project {
        id: 7,
        name: "Acme Launch".to_owned(),
        url: SAMPLE_URL.to_owned(),
        status: ProjectStatus::Completed,
        analysis: funnel.as_ref().map(|funnel| funnel.base_analysis.clone()),
        funnel,
        email_sequence,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
