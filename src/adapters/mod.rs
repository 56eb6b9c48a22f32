//! Adapter layer: transport-facing surfaces over the service layer.

pub mod http;
