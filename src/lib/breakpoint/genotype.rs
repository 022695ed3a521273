//! Diploid genotype likelihoods from classified reads.
//!
//! Each read at a site is either alternate-supporting or reference-supporting,
//! with its mapping quality giving the probability the classification is wrong.
//! The three hypotheses carry 0, 1 or 2 alternate copies out of 2.

use std::fmt;

/// Log-likelihood reported for hypotheses with no evidence.
pub const SENTINEL_LOG_LIKELIHOOD: f64 = -255.0;
/// Samples with fewer reads at a site are not genotyped.
pub const MIN_GENOTYPE_READS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Genotype {
    #[default]
    NoCall,
    HomRef,
    Het,
    HomAlt,
}

impl Genotype {
    pub fn label(&self) -> &'static str {
        match self {
            Genotype::NoCall => "./.",
            Genotype::HomRef => "0/0",
            Genotype::Het => "0/1",
            Genotype::HomAlt => "1/1",
        }
    }

    /// Alternate allele dosage, `None` for a missing call.
    pub fn alt_copies(&self) -> Option<u32> {
        match self {
            Genotype::NoCall => None,
            Genotype::HomRef => Some(0),
            Genotype::Het => Some(1),
            Genotype::HomAlt => Some(2),
        }
    }

    pub fn is_non_ref(&self) -> bool {
        matches!(self, Genotype::Het | Genotype::HomAlt)
    }
}

impl fmt::Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One read as seen by the likelihood model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadObservation {
    pub mapq: u8,
    pub alternate: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenotypeCall {
    pub genotype: Genotype,
    /// Log-likelihoods for 0/0, 0/1 and 1/1.
    pub log_likelihoods: [f64; 3],
    /// Alternate-supporting reads (`nBad`).
    pub n_alt: u32,
    /// Reference-supporting reads (`nGood`).
    pub n_ref: u32,
}

impl Default for GenotypeCall {
    fn default() -> Self {
        Self {
            genotype: Genotype::NoCall,
            log_likelihoods: [SENTINEL_LOG_LIKELIHOOD; 3],
            n_alt: 0,
            n_ref: 0,
        }
    }
}

/// Phred-scaled quality to error probability.
#[inline]
pub fn unphred(quality: f64) -> f64 {
    10f64.powf(-quality / 10.0)
}

/// Genotype one sample at one site.
///
/// `n_reads` is the number of alignments loaded for the sample and sets both the
/// minimum-depth check and the normalisation; `observations` holds one entry
/// per distinct read.
pub fn call_genotype<I>(n_reads: u32, observations: I) -> GenotypeCall
where
    I: IntoIterator<Item = ReadObservation>,
{
    if n_reads < MIN_GENOTYPE_READS {
        return GenotypeCall::default();
    }

    let mut ll = [0.0f64; 3];
    let mut n_alt = 0u32;
    let mut n_ref = 0u32;
    for obs in observations {
        let error = unphred(obs.mapq as f64);
        if obs.alternate {
            n_alt += 1;
            ll[0] += (2.0 * error).ln();
            ll[1] += (1.0 - error + error).ln();
            ll[2] += (2.0 * (1.0 - error)).ln();
        } else {
            n_ref += 1;
            ll[0] += (2.0 * (1.0 - error)).ln();
            ll[1] += (error + 1.0 - error).ln();
            ll[2] += (2.0 * error).ln();
        }
    }

    let norm = n_reads as f64 * std::f64::consts::LN_2;
    for value in ll.iter_mut() {
        *value -= norm;
    }
    if n_ref == 0 {
        ll[0] = SENTINEL_LOG_LIKELIHOOD;
        ll[1] = SENTINEL_LOG_LIKELIHOOD;
    }
    if n_alt == 0 {
        ll[1] = SENTINEL_LOG_LIKELIHOOD;
        ll[2] = SENTINEL_LOG_LIKELIHOOD;
    }

    // Earlier hypotheses win ties.
    let mut genotype = Genotype::HomRef;
    let mut best = ll[0];
    if ll[1] > best {
        genotype = Genotype::Het;
        best = ll[1];
    }
    if ll[2] > best {
        genotype = Genotype::HomAlt;
    }

    GenotypeCall {
        genotype,
        log_likelihoods: ll,
        n_alt,
        n_ref,
    }
}
