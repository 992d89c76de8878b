//! the typed model of a TransXChange document: stops, operators, journey
//! patterns and the vehicle journeys that run over them.
mod journey_pattern;
mod operator;
mod stop;
mod stop_visit;
mod vehicle_journey;

pub use journey_pattern::{JourneyPattern, PatternId};
pub use operator::{Operator, OperatorDirectory};
pub use stop::{EmptyDirectory, Stop, StopDirectory};
pub use stop_visit::{Activity, StopVisit, TimingLink, TimingStatus};
pub use vehicle_journey::{display_order, JourneyId, JourneyTimes, VehicleJourney};

pub(crate) use vehicle_journey::sort_for_display;
