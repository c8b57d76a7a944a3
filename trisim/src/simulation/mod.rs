pub mod states;
pub mod params;
pub mod forces;
pub mod integrator;
pub mod conservation;
pub mod trajectory;
pub mod collision;
pub mod clock;
pub mod scenario;
pub mod engine;
