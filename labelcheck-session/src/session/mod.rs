//! Review session state machine.
//!
//! The design separates:
//! - **State**: what the reviewer sees (`SessionState`)
//! - **Events**: reviewer intents and effect results (`Event`)
//! - **Effects**: store and resumption calls to make (`Effect`)
//! - **Transition**: pure function `(State, Event) -> (State, Vec<Effect>)`
//!
//! The interpreter executes effects and returns result events; the driver
//! feeds them back until the session settles.

pub mod driver;
pub mod effect;
pub mod event;
pub mod interpreter;
pub mod state;
pub mod transition;

pub use driver::*;
pub use effect::*;
pub use event::*;
pub use interpreter::*;
pub use state::*;
pub use transition::*;
