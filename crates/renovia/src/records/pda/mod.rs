//! Renovation subsidy applications ("plans d'aide").

pub mod domain;
pub mod grant;
pub mod router;
pub mod service;


pub use domain::{Pda, PdaDraft};
pub use grant::grant_amount;
pub use router::pda_router;
pub use service::PdaService;
