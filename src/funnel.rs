//! The funnel module composes the main page, the offer chain and the flow
//! graph into one [`Funnel`].

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::analysis::Analysis;
use crate::copy::{Customizations, MainPageCopy, generate_copy};
use crate::flow::{FlowNode, design_funnel_flow, validate_flow};
use crate::offer::{Offer, OfferKind, ProductInfo, generate_offer};

/// A complete sales funnel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Funnel {
    pub main_page: MainPageCopy,
    pub upsells: Vec<Offer>,
    pub downsells: Vec<Offer>,
    pub funnel_flow: Vec<FlowNode>,
    pub customizations: Customizations,
    pub base_analysis: Analysis,
}

/// Generates a funnel from a page analysis.
///
/// Produces the main page copy, `num_upsells` upsells and `num_downsells`
/// downsells, then wires them together with [`design_funnel_flow`].
/// Fallback pages are kept in the funnel; their `error` field records why.
pub fn generate_funnel(analysis: &Analysis, customizations: &Customizations) -> Funnel {
    info!(
        "Generating funnel with {} upsells and {} downsells",
        customizations.num_upsells(),
        customizations.num_downsells()
    );

    let main_page = generate_copy(analysis, customizations).into_record();

    let product = ProductInfo {
        product_type: analysis.product_type.clone(),
        brand_name: customizations.brand_name().to_string(),
    };

    let offers = |kind: OfferKind, count: u32| -> Vec<Offer> {
        (1..=count)
            .map(|position| generate_offer(&product, kind, position).into_record())
            .collect()
    };
    let upsells = offers(OfferKind::Upsell, customizations.num_upsells());
    let downsells = offers(OfferKind::Downsell, customizations.num_downsells());

    let funnel_flow = design_funnel_flow(&upsells, &downsells);
    if let Err(err) = validate_flow(&funnel_flow) {
        warn!("Funnel flow has a dangling reference: {err}");
    }

    Funnel {
        main_page,
        upsells,
        downsells,
        funnel_flow,
        customizations: customizations.clone(),
        base_analysis: analysis.clone(),
    }
}
