//! Descriptive statistics over word counts.

use std::collections::HashMap;
use std::fmt;

use clap::ValueEnum;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::tokens::{fpmw, zipf};

/// Which variance estimator a standard deviation uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Deviation {
    /// Divide by `n - 1`.
    #[default]
    Sample,
    /// Divide by `n`.
    Population,
}

///Arithmetic mean.
/// # Example
/// ```
/// use srt_freqs::mean;
/// assert_eq!(mean(&[1.0, 2.0, 3.0]).unwrap(), 2.0);
/// assert!(mean(&[]).is_err());
/// ```
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(Error::EmptySample);
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

///Standard deviation of `values`.
///A sample SD needs at least two observations, a population SD at least one.
/// # Example
/// ```
/// use srt_freqs::{Deviation, std_dev};
/// let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
/// assert_eq!(std_dev(&v, Deviation::Population).unwrap(), 2.0);
/// assert!((std_dev(&v, Deviation::Sample).unwrap() - 2.138).abs() < 1e-3);
/// ```
pub fn std_dev(values: &[f64], kind: Deviation) -> Result<f64> {
    let n = values.len();
    let divisor = match kind {
        Deviation::Population if n == 0 => return Err(Error::EmptySample),
        Deviation::Population => n as f64,
        Deviation::Sample if n < 2 => {
            return Err(Error::SampleTooSmall { needed: 2, got: n });
        }
        Deviation::Sample => (n - 1) as f64,
    };
    let m = mean(values)?;
    let squares: f64 = values.iter().map(|v| (v - m).powi(2)).sum();
    Ok((squares / divisor).sqrt())
}

/// Mean and standard deviation of one measure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Spread {
    pub mean: f64,
    /// `None` when the deviation is undefined for the sample size.
    pub sd: Option<f64>,
}

impl Spread {
    pub fn of(values: &[f64], kind: Deviation) -> Option<Self> {
        let mean = mean(values).ok()?;
        let sd = match std_dev(values, kind) {
            Ok(sd) => Some(sd),
            Err(e) => {
                log::debug!("standard deviation undefined: {e}");
                None
            }
        };
        Some(Spread { mean, sd })
    }
}

impl fmt::Display for Spread {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sd {
            Some(sd) => write!(f, "{} (SD = {})", round2(self.mean), round2(sd)),
            None => write!(f, "{} (SD = n/a)", round2(self.mean)),
        }
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Summary printed after each file and once for the whole run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub subtitles: usize,
    pub total_words: u64,
    pub unique_words: usize,
    /// Spread of per-word counts; `None` when there are no words.
    pub frequency: Option<Spread>,
    pub fpmw: Option<Spread>,
    pub zipf: Option<Spread>,
}

impl Summary {
    /// Summarizes a frequency map whose counts add up to `total_words`.
    pub fn from_counts(
        subtitles: usize,
        counts: &HashMap<String, u64>,
        total_words: u64,
        kind: Deviation,
    ) -> Self {
        let reps: Vec<f64> = counts.values().map(|&c| c as f64).collect();
        let reps_fpmw: Vec<f64> = counts.values().map(|&c| fpmw(c, total_words)).collect();
        let reps_zipf: Vec<f64> = reps_fpmw.iter().map(|&f| zipf(f)).collect();
        Summary {
            subtitles,
            total_words,
            unique_words: counts.len(),
            frequency: Spread::of(&reps, kind),
            fpmw: Spread::of(&reps_fpmw, kind),
            zipf: Spread::of(&reps_zipf, kind),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, " -{} subtitles", self.subtitles)?;
        writeln!(f, " -{} total words", self.total_words)?;
        write!(f, " -{} unique words", self.unique_words)?;
        for (label, spread) in [
            ("frequency", self.frequency),
            ("fpmw", self.fpmw),
            ("zipf", self.zipf),
        ] {
            if let Some(spread) = spread {
                write!(f, "\n -M {label} = {spread}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEXTBOOK: [f64; 8] = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];

    #[test]
    fn test_textbook_deviation() {
        let p = std_dev(&TEXTBOOK, Deviation::Population).unwrap();
        let s = std_dev(&TEXTBOOK, Deviation::Sample).unwrap();
        assert!((p - 2.0).abs() < 1e-12);
        assert!((s - 2.138_089_935).abs() < 1e-6);
    }

    #[test]
    fn test_small_samples() {
        assert!(matches!(
            std_dev(&[3.0], Deviation::Sample),
            Err(Error::SampleTooSmall { needed: 2, got: 1 })
        ));
        assert_eq!(std_dev(&[3.0], Deviation::Population).unwrap(), 0.0);
        assert!(matches!(
            std_dev(&[], Deviation::Population),
            Err(Error::EmptySample)
        ));
        assert!(matches!(mean(&[]), Err(Error::EmptySample)));
    }

    #[test]
    fn test_summary_from_counts() {
        let mut counts = HashMap::new();
        counts.insert("cat".to_string(), 2_u64);
        counts.insert("dog".to_string(), 1_u64);
        let s = Summary::from_counts(1, &counts, 3, Deviation::Sample);
        assert_eq!(s.unique_words, 2);
        assert_eq!(s.total_words, 3);
        let freq = s.frequency.unwrap();
        assert!((freq.mean - 1.5).abs() < 1e-12);
        assert!((freq.sd.unwrap() - 0.5_f64.sqrt()).abs() < 1e-12);
        assert!((s.fpmw.unwrap().mean - 500_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_summary_single_word_has_no_sample_sd() {
        let mut counts = HashMap::new();
        counts.insert("only".to_string(), 4_u64);
        let s = Summary::from_counts(2, &counts, 4, Deviation::Sample);
        assert_eq!(s.frequency.unwrap().sd, None);
        assert!(s.to_string().contains("-M frequency = 4 (SD = n/a)"));
    }

    #[test]
    fn test_summary_empty() {
        let s = Summary::from_counts(0, &HashMap::new(), 0, Deviation::Sample);
        assert_eq!(s.frequency, None);
        assert_eq!(s.to_string(), " -0 subtitles\n -0 total words\n -0 unique words");
    }
}
