//! External collaborators consumed by the eligibility pipeline.

pub mod auth {
    pub use crate::auth::*;
}

pub mod history {
    pub use crate::history::*;
}

pub mod pincode_client {
    pub use crate::pincode_client::*;
}

pub mod sectors {
    pub use crate::sectors::*;
}

pub mod thresholds {
    pub use crate::thresholds::*;
}
