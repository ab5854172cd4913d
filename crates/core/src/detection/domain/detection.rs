use std::fmt;

use serde::{Deserialize, Serialize};

use crate::shared::bounding_box::BoundingBox;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionCategory {
    Face,
    Person,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Gender::Male => write!(f, "male"),
            Gender::Female => write!(f, "female"),
        }
    }
}

/// One box reported by the detector, optionally annotated by the predictor.
#[derive(Clone, Debug, PartialEq)]
pub struct Detection {
    pub bounding_box: BoundingBox,
    pub category: DetectionCategory,
    pub age: Option<f64>,
    pub gender: Option<Gender>,
    pub gender_confidence: Option<f64>,
}

impl Detection {
    pub fn new(bounding_box: BoundingBox, category: DetectionCategory) -> Self {
        Self {
            bounding_box,
            category,
            age: None,
            gender: None,
            gender_confidence: None,
        }
    }

    pub fn face(bounding_box: BoundingBox) -> Self {
        Self::new(bounding_box, DetectionCategory::Face)
    }

    pub fn is_face(&self) -> bool {
        self.category == DetectionCategory::Face
    }
}
