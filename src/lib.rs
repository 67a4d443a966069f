pub mod celebrate;
pub mod engine;
pub mod export;
pub mod predictor;
pub mod reference;
pub mod state;
pub mod trend;
