//! Инфраструктурный слой вокруг движка столов:
//! - генерация ID;
//! - RNG-реализации для движка;
//! - хранилища балансов и снапшотов столов.

pub mod ids;
pub mod persistence;
pub mod rng;

pub use ids::*;
pub use persistence::*;
pub use rng::*;
