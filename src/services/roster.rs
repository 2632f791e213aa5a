use async_trait::async_trait;

use super::{RosterSource, ServiceError};
use crate::model::CarrierCreate;

/// A fixed roster held in memory.
#[derive(Debug, Clone)]
pub struct StaticRoster {
    carriers: Vec<CarrierCreate>,
}

impl StaticRoster {
    pub fn new(carriers: Vec<CarrierCreate>) -> Self {
        Self { carriers }
    }

    /// Five carriers around College Park, MD.
    pub fn seed() -> Self {
        Self::new(vec![
            CarrierCreate::new("C1", 39.0082, -76.9597, 5.2),
            CarrierCreate::new("C2", 39.0150, -76.9401, 6.8),
            CarrierCreate::new("C3", 39.0205, -76.9305, 4.1),
            CarrierCreate::new("C4", 39.0165, -76.9273, 8.92),
            CarrierCreate::new("C5", 38.9845, -76.9676, 9.1),
        ])
    }
}

#[async_trait]
impl RosterSource for StaticRoster {
    async fn fetch(&self) -> Result<Vec<CarrierCreate>, ServiceError> {
        Ok(self.carriers.clone())
    }
}
