//! Host integration contracts (connectivity probing, login navigation).
//!
//! The executor consults these hooks while classifying failures; embedders plug in whatever
//! their environment offers (an OS reachability API, a router, a window handle).

pub mod connectivity;
pub mod redirect;

pub use connectivity::*;
pub use redirect::*;
