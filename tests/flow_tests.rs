use crate::funnel_extras::{customizations, sample_analysis, sample_funnel};
use funnelcraft::flow::{NodeType, find_node};
use funnelcraft::{FlowAction, FlowNode, generate_funnel, validate_flow};
use spectral::prelude::*;

mod funnel_extras;

fn actions(flow: &[FlowNode], id: &str) -> (String, String) {
    let node = find_node(flow, id).unwrap_or_else(|| panic!("Missing node {id}"));
    (node.accept_action.to_string(), node.decline_action.to_string())
}

fn pair(accept: &str, decline: &str) -> (String, String) {
    (accept.to_owned(), decline.to_owned())
}

#[tokio::test]
async fn two_upsells_two_downsells_flow() {
    let funnel = sample_funnel("Acme", 2, 2).await;
    let flow = &funnel.funnel_flow;

    let ids: Vec<&str> = flow.iter().map(|node| node.id.as_str()).collect();
    assert_that(&ids).is_equal_to(vec![
        "main",
        "upsell_1",
        "upsell_2",
        "downsell_1",
        "downsell_2",
        "thank_you",
    ]);

    assert_that(&actions(flow, "main")).is_equal_to(pair("to_upsell_1", "exit"));
    assert_that(&actions(flow, "upsell_1")).is_equal_to(pair("to_upsell_2", "to_downsell_1"));
    assert_that(&actions(flow, "upsell_2")).is_equal_to(pair("to_thank_you", "to_downsell_2"));
    assert_that(&actions(flow, "downsell_1")).is_equal_to(pair("to_upsell_2", "to_upsell_2"));
    assert_that(&actions(flow, "downsell_2")).is_equal_to(pair("to_thank_you", "to_thank_you"));
    assert_that(&actions(flow, "thank_you")).is_equal_to(pair("exit", "exit"));

    assert_that(&validate_flow(flow)).is_ok();
}

#[tokio::test]
async fn every_target_exists_for_all_counts() {
    let analysis = sample_analysis().await;

    for num_upsells in 1..=5 {
        for num_downsells in 1..=5 {
            let funnel =
                generate_funnel(&analysis, &customizations("Acme", num_upsells, num_downsells));
            let flow = &funnel.funnel_flow;

            let count = |node_type: NodeType| {
                flow.iter()
                    .filter(|node| node.node_type == node_type)
                    .count()
            };
            assert_that(&count(NodeType::Main)).is_equal_to(1);
            assert_that(&count(NodeType::ThankYou)).is_equal_to(1);
            assert_that(&count(NodeType::Upsell)).is_equal_to(num_upsells as usize);
            assert_that(&count(NodeType::Downsell)).is_equal_to(num_downsells as usize);

            assert_that(&validate_flow(flow)).is_ok();
        }
    }
}

#[tokio::test]
async fn more_upsells_than_downsells_skips_missing_downsell() {
    let funnel = sample_funnel("Acme", 3, 1).await;
    let flow = &funnel.funnel_flow;

    assert_that(&actions(flow, "upsell_1")).is_equal_to(pair("to_upsell_2", "to_downsell_1"));
    assert_that(&actions(flow, "upsell_2")).is_equal_to(pair("to_upsell_3", "to_upsell_3"));
    assert_that(&actions(flow, "upsell_3")).is_equal_to(pair("to_thank_you", "to_thank_you"));
    assert_that(&actions(flow, "downsell_1")).is_equal_to(pair("to_upsell_2", "to_upsell_2"));
}

#[tokio::test]
async fn no_upsells_keeps_dangling_main_action() {
    let funnel = sample_funnel("Acme", 0, 0).await;
    let flow = &funnel.funnel_flow;

    assert_that(&flow.len()).is_equal_to(2);
    assert_that(&actions(flow, "main")).is_equal_to(pair("to_upsell_1", "exit"));
    assert_that(&find_node(flow, "upsell_1")).is_none();

    let error = validate_flow(flow).expect_err("upsell_1 is not a node of the flow");
    assert_that(&error.to_string()).contains("upsell_1");
}

#[test]
fn actions_round_trip_as_literal_strings() {
    assert_that(&"exit".parse::<FlowAction>().ok()).is_equal_to(Some(FlowAction::Exit));
    assert_that(&"to_downsell_3".parse::<FlowAction>().ok())
        .is_equal_to(Some(FlowAction::to_node("downsell_3")));
    assert_that(&serde_json::to_string(&FlowAction::to_node("thank_you")).ok())
        .is_equal_to(Some("\"to_thank_you\"".to_owned()));
}

#[test]
fn malformed_actions_are_rejected() {
    for malformed in ["", "to_", "upsell_1", "goto_main", "Exit"] {
        assert_that(&malformed.parse::<FlowAction>()).is_err();
    }

    let node = r#"{"id":"main","type":"main","name":"Main","accept_action":"jump","decline_action":"exit"}"#;
    assert_that(&serde_json::from_str::<FlowNode>(node)).is_err();
}
