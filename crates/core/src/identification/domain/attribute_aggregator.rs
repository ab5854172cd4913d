use crate::detection::domain::detection::Gender;
use crate::identification::domain::face_observation::FaceObservation;
use crate::identification::domain::identification_error::IdentificationError;

/// Combined attributes of one cluster. Values are unrounded.
#[derive(Clone, Debug, PartialEq)]
pub struct AggregatedAttributes {
    pub mean_age: f64,
    pub gender: Gender,
    /// Mean predictor confidence over the members labelled with `gender`.
    pub mean_confidence: f64,
    pub appearances: usize,
}

/// Aggregates the age and gender of the observations at `members`.
///
/// Age is the arithmetic mean, kept inside the members' age range against
/// summation rounding. Gender is the most frequent label, ties going to the
/// label seen first in `members` order.
pub fn aggregate_attributes(
    observations: &[FaceObservation],
    members: &[usize],
) -> Result<AggregatedAttributes, IdentificationError> {
    if members.is_empty() {
        return Err(IdentificationError::EmptyCluster);
    }

    let mut age_sum = 0.0;
    let mut age_min = f64::INFINITY;
    let mut age_max = f64::NEG_INFINITY;
    // (gender, count, confidence sum) in order of first occurrence
    let mut tally: Vec<(Gender, usize, f64)> = Vec::new();

    for &index in members {
        let obs = observations
            .get(index)
            .ok_or(IdentificationError::MemberOutOfRange {
                index,
                observations: observations.len(),
            })?;
        age_sum += obs.age;
        age_min = age_min.min(obs.age);
        age_max = age_max.max(obs.age);
        match tally.iter_mut().find(|(g, _, _)| *g == obs.gender) {
            Some((_, count, confidence)) => {
                *count += 1;
                *confidence += obs.confidence;
            }
            None => tally.push((obs.gender, 1, obs.confidence)),
        }
    }

    let mut mode = tally[0];
    for &entry in &tally[1..] {
        if entry.1 > mode.1 {
            mode = entry;
        }
    }
    let (gender, count, confidence_sum) = mode;

    let mean_age = (age_sum / members.len() as f64).clamp(age_min, age_max);

    Ok(AggregatedAttributes {
        mean_age,
        gender,
        mean_confidence: confidence_sum / count as f64,
        appearances: members.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::bounding_box::BoundingBox;
    use approx::assert_relative_eq;
    use rstest::rstest;

    fn observation(age: f64, gender: Gender, confidence: f64) -> FaceObservation {
        FaceObservation {
            image_ref: "img.jpg".into(),
            bounding_box: BoundingBox::new(0.0, 0.0, 10.0, 10.0),
            features: vec![0.0; 4],
            age,
            gender,
            confidence,
        }
    }

    #[test]
    fn test_mean_age_and_majority_gender() {
        let obs = vec![
            observation(20.0, Gender::Female, 0.9),
            observation(22.0, Gender::Female, 0.7),
            observation(24.0, Gender::Male, 0.6),
        ];
        let attrs = aggregate_attributes(&obs, &[0, 1, 2]).unwrap();
        assert_relative_eq!(attrs.mean_age, 22.0);
        assert_eq!(attrs.gender, Gender::Female);
        assert_relative_eq!(attrs.mean_confidence, 0.8, epsilon = 1e-12);
        assert_eq!(attrs.appearances, 3);
    }

    #[test]
    fn test_only_members_are_used() {
        let obs = vec![
            observation(30.0, Gender::Male, 0.5),
            observation(50.0, Gender::Female, 0.5),
            observation(34.0, Gender::Male, 0.5),
        ];
        let attrs = aggregate_attributes(&obs, &[0, 2]).unwrap();
        assert_relative_eq!(attrs.mean_age, 32.0);
        assert_eq!(attrs.gender, Gender::Male);
        assert_eq!(attrs.appearances, 2);
    }

    #[test]
    fn test_gender_tie_goes_to_first_seen() {
        let obs = vec![
            observation(30.0, Gender::Male, 0.5),
            observation(31.0, Gender::Female, 0.5),
            observation(32.0, Gender::Female, 0.5),
            observation(33.0, Gender::Male, 0.5),
        ];
        assert_eq!(
            aggregate_attributes(&obs, &[0, 1, 2, 3]).unwrap().gender,
            Gender::Male
        );
        assert_eq!(
            aggregate_attributes(&obs, &[1, 0, 2, 3]).unwrap().gender,
            Gender::Female
        );
    }

    #[test]
    fn test_mean_age_not_rounded() {
        let obs = vec![
            observation(20.0, Gender::Male, 0.5),
            observation(20.0, Gender::Male, 0.5),
            observation(21.0, Gender::Male, 0.5),
        ];
        let attrs = aggregate_attributes(&obs, &[0, 1, 2]).unwrap();
        assert_relative_eq!(attrs.mean_age, 61.0 / 3.0);
    }

    #[test]
    fn test_age_within_member_range() {
        let ages = [18.5, 44.0, 27.25, 39.0, 61.0];
        let obs: Vec<_> = ages
            .iter()
            .map(|&a| observation(a, Gender::Female, 0.5))
            .collect();
        let attrs = aggregate_attributes(&obs, &[0, 1, 2, 3, 4]).unwrap();
        assert!(attrs.mean_age >= 18.5 && attrs.mean_age <= 61.0);
    }

    #[rstest]
    #[case(&[0.1; 3])]
    #[case(&[0.7; 7])]
    #[case(&[0.1, 0.2, 0.3])]
    #[case(&[33.3; 9])]
    fn test_mean_never_leaves_age_range(#[case] ages: &[f64]) {
        let obs: Vec<_> = ages
            .iter()
            .map(|&a| observation(a, Gender::Male, 0.5))
            .collect();
        let members: Vec<usize> = (0..ages.len()).collect();
        let attrs = aggregate_attributes(&obs, &members).unwrap();

        let lo = ages.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = ages.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert!(
            attrs.mean_age >= lo && attrs.mean_age <= hi,
            "mean {} outside [{lo}, {hi}]",
            attrs.mean_age
        );
    }

    #[test]
    fn test_equal_ages_give_that_age_exactly() {
        let obs = vec![observation(0.1, Gender::Female, 0.5); 3];
        let attrs = aggregate_attributes(&obs, &[0, 1, 2]).unwrap();
        assert_eq!(attrs.mean_age, 0.1);
    }

    #[test]
    fn test_empty_members_is_error() {
        let obs = vec![observation(20.0, Gender::Male, 0.5)];
        assert_eq!(
            aggregate_attributes(&obs, &[]),
            Err(IdentificationError::EmptyCluster)
        );
    }

    #[test]
    fn test_out_of_range_member_is_error() {
        let obs = vec![observation(20.0, Gender::Male, 0.5)];
        assert_eq!(
            aggregate_attributes(&obs, &[0, 3]),
            Err(IdentificationError::MemberOutOfRange {
                index: 3,
                observations: 1
            })
        );
    }
}
