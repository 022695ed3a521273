//! Target versus background likelihood-ratio test.
//!
//! Called genotypes are pooled into per-cohort allele counts. The alternative
//! hypothesis gives each cohort its own allele frequency; the null shares one
//! frequency across both. The statistic `2 * (alt - null)` is reported as is.

use statrs::function::gamma::ln_gamma;

use crate::breakpoint::genotype::Genotype;

pub const MIN_FREQUENCY: f64 = 0.00001;
pub const MAX_FREQUENCY: f64 = 0.99999;

/// Clamp a frequency into `[MIN_FREQUENCY, MAX_FREQUENCY]`; undefined maps to the floor.
#[inline]
pub fn bound(frequency: f64) -> f64 {
    if frequency.is_nan() || frequency <= MIN_FREQUENCY {
        MIN_FREQUENCY
    } else if frequency >= MAX_FREQUENCY {
        MAX_FREQUENCY
    } else {
        frequency
    }
}

/// Log probability of `successes` out of `trials` at rate `p`.
pub fn ln_binomial(successes: f64, trials: f64, p: f64) -> f64 {
    ln_gamma(trials + 1.0) - ln_gamma(successes + 1.0) - ln_gamma(trials - successes + 1.0)
        + successes * p.ln()
        + (trials - successes) * (1.0 - p).ln()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlleleCounts {
    pub ref_alleles: u32,
    pub alt_alleles: u32,
    /// Samples with a call.
    pub samples: u32,
}

impl AlleleCounts {
    /// Add one sample's call; missing calls are skipped.
    pub fn add(&mut self, genotype: Genotype) {
        if let Some(alt) = genotype.alt_copies() {
            self.alt_alleles += alt;
            self.ref_alleles += 2 - alt;
            self.samples += 1;
        }
    }

    pub fn total(&self) -> u32 {
        self.ref_alleles + self.alt_alleles
    }

    /// Clamped alternate allele frequency.
    pub fn frequency(&self) -> f64 {
        bound(self.alt_alleles as f64 / self.total() as f64)
    }

    fn ln_likelihood(&self, p: f64) -> f64 {
        ln_binomial(self.alt_alleles as f64, self.total() as f64, p)
    }
}

impl std::ops::Add for AlleleCounts {
    type Output = AlleleCounts;

    fn add(self, rhs: Self) -> Self::Output {
        AlleleCounts {
            ref_alleles: self.ref_alleles + rhs.ref_alleles,
            alt_alleles: self.alt_alleles + rhs.alt_alleles,
            samples: self.samples + rhs.samples,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CohortTest {
    pub target: AlleleCounts,
    pub background: AlleleCounts,
    pub target_af: f64,
    pub background_af: f64,
    pub combined_af: f64,
    pub lrt: f64,
}

impl CohortTest {
    pub fn from_counts(target: AlleleCounts, background: AlleleCounts) -> Self {
        let target_af = target.frequency();
        let background_af = background.frequency();
        let combined_af = (target + background).frequency();

        let alt = target.ln_likelihood(target_af) + background.ln_likelihood(background_af);
        let null = target.ln_likelihood(combined_af) + background.ln_likelihood(combined_af);

        Self {
            target,
            background,
            target_af,
            background_af,
            combined_af,
            lrt: 2.0 * (alt - null),
        }
    }

    pub fn from_genotypes<T, B>(target: T, background: B) -> Self
    where
        T: IntoIterator<Item = Genotype>,
        B: IntoIterator<Item = Genotype>,
    {
        let mut t = AlleleCounts::default();
        target.into_iter().for_each(|g| t.add(g));
        let mut b = AlleleCounts::default();
        background.into_iter().for_each(|g| b.add(g));
        Self::from_counts(t, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn counts_skip_missing_calls() {
        let mut counts = AlleleCounts::default();
        for g in [Genotype::HomRef, Genotype::Het, Genotype::NoCall, Genotype::HomAlt] {
            counts.add(g);
        }
        assert_eq!(
            counts,
            AlleleCounts {
                ref_alleles: 3,
                alt_alleles: 3,
                samples: 3
            }
        );
        assert!((counts.frequency() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn empty_cohort_frequency_is_floored() {
        assert_eq!(AlleleCounts::default().frequency(), MIN_FREQUENCY);
    }

    #[test]
    fn identical_cohorts_give_zero_statistic() {
        let test = CohortTest::from_genotypes(
            [Genotype::Het, Genotype::HomRef],
            [Genotype::Het, Genotype::HomRef],
        );
        assert!(test.lrt.abs() < 1e-9);
        assert!((test.combined_af - 0.25).abs() < 1e-12);
    }

    #[test]
    fn divergent_cohorts_give_positive_statistic() {
        let test = CohortTest::from_genotypes(
            [Genotype::HomAlt, Genotype::HomAlt],
            [Genotype::HomRef, Genotype::HomRef],
        );
        assert_eq!(test.target_af, MAX_FREQUENCY);
        assert_eq!(test.background_af, MIN_FREQUENCY);
        assert!((test.combined_af - 0.5).abs() < 1e-12);
        assert!(test.lrt > 10.0);
        assert!(test.lrt.is_finite());
    }

    #[test]
    fn ln_binomial_matches_direct_computation() {
        // C(4,1) * 0.5^4 = 0.25
        assert!((ln_binomial(1.0, 4.0, 0.5) - 0.25f64.ln()).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn bound_stays_in_range(x in proptest::num::f64::ANY) {
            let b = bound(x);
            prop_assert!((MIN_FREQUENCY..=MAX_FREQUENCY).contains(&b));
        }

        #[test]
        fn statistic_is_symmetric_under_label_swap(
            t in proptest::collection::vec(0u32..3, 0..8),
            b in proptest::collection::vec(0u32..3, 0..8),
        ) {
            let to_gt = |v: &Vec<u32>| -> Vec<Genotype> {
                v.iter().map(|&c| match c {
                    0 => Genotype::HomRef,
                    1 => Genotype::Het,
                    _ => Genotype::HomAlt,
                }).collect()
            };
            let forward = CohortTest::from_genotypes(to_gt(&t), to_gt(&b));
            let swapped = CohortTest::from_genotypes(to_gt(&b), to_gt(&t));
            prop_assert!((forward.lrt - swapped.lrt).abs() < 1e-9);
            prop_assert_eq!(forward.target_af, swapped.background_af);
            prop_assert!(forward.lrt.is_finite());
            prop_assert!(forward.lrt > -1e-9);
        }
    }
}
