pub mod age_gender_predictor;
pub mod detection;
pub mod face_detector;
