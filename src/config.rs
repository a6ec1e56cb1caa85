//! JSON configuration for the tracker.
//!
//! Every field is optional; missing ones take the defaults of [`FlowParams`]
//! and [`LkParams`](crate::flow::LkParams).
//!
//! ```json
//! { "pyr_levels": 3, "gradient": "scharr", "lk": { "window_size": 21 } }
//! ```
use crate::error::FlowResult;
use crate::flow::FlowParams;

/// Parse and validate a [`FlowParams`] document.
pub fn parse_flow_params(json: &str) -> FlowResult<FlowParams> {
    let params: FlowParams = serde_json::from_str(json)?;
    params.validate()?;
    Ok(params)
}
