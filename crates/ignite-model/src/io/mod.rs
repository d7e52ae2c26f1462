mod spec;
pub use spec::{IoPropertiesSpec, WellKnownIo};

mod properties;
pub use properties::{IoCharacteristics, IoProperties};
