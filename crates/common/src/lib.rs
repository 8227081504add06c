//! Shared types: spatial transforms and colors.

pub mod types;

pub use types::{Color, ColorParseError, Transform};

pub fn crate_info() -> &'static str {
    concat!("cubescene-common v", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("common"));
    }
}
