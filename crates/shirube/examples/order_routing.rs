//! Order Routing.
//!
//! This example routes the output of a checkout step to one of several
//! follow-up steps:
//! 1. Orders flagged for fraud go to manual review
//! 2. Large domestic orders go to express shipping
//! 3. Everything else goes to standard shipping
//!
//! The rules are loaded from YAML, combined with a custom condition
//! plugin, and evaluated with a logging observer.
//!
//! Each decision is logged at `info` level by `TracingObserver`.

use serde_json::json;
use shirube::prelude::*;
use std::sync::Arc;

const RULES: &str = r#"
- target: manual_review
  origin: checkout
  guards:
    - action: greater_than
      args:
        threshold: 0.7
      filters:
        - action: json_select
          args:
            path: risk.score
- target: express_shipping
  origin: checkout
  guards:
    - action: greater_than
      args:
        threshold: 100
      filters:
        - action: json_select
          args:
            path: order.total
    - action: domestic
      args:
        country: JP
- target: standard_shipping
  origin: checkout
"#;

fn load_rules(text: &str) -> Result<Vec<TransitionRule>, DocumentError> {
    let documents: Vec<Value> =
        serde_yaml::from_str(text).map_err(|e| DocumentError::Syntax(e.to_string()))?;
    documents.iter().map(TransitionRule::from_document).collect()
}

fn registry() -> PluginRegistry {
    let mut registry = PluginRegistry::with_builtins();
    let added = registry.register_condition_fn(
        "domestic",
        Schema::new().input("country", ParamType::String),
        |args, order| {
            let country = args.get_str("country")?;
            Ok(order["order"]["country"].as_str() == Some(country))
        },
    );
    if let Err(e) = added {
        tracing::warn!("Custom condition not installed: {}", e);
    }
    registry
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let rules = load_rules(RULES)?;
    let log = Arc::new(TransitionLog::new());
    let engine = TransitionEngine::builder()
        .registry(registry())
        .shared_observer(Arc::new(
            shirube::Observers::new()
                .with(TracingObserver)
                .with(Arc::clone(&log)),
        ))
        .build();

    let orders = [
        json!({"order": {"total": 250, "country": "JP"}, "risk": {"score": 0.1}}),
        json!({"order": {"total": 250, "country": "US"}, "risk": {"score": 0.2}}),
        json!({"order": {"total": 40, "country": "JP"}, "risk": {"score": 0.9}}),
    ];

    for order in &orders {
        match engine.select_next(&rules, order)? {
            Some(next) => println!("{} -> {}", order["order"], next),
            None => println!("{} -> (no transition)", order["order"]),
        }
    }

    println!("\n{} rules evaluated, {} fired", log.len(), log.taken().len());
    Ok(())
}
