//! # bobsim-engine::rng
//!
//! The discipline for using the master RNG (§9 Design Note "Shared
//! process-wide state"). Every draw a node behavior makes through
//! `NodeCtx::rand_f64`/`rand_u64` is routed through `RngDiscipline`, which
//! tags it with a call-site label and records it in the `Recorder` for
//! postmortem audit of a run's nondeterministic decisions.

use rand::RngCore;
use rand_chacha::ChaCha20Rng;
use std::collections::BTreeMap;

pub struct RngDiscipline<'a> {
    rng: &'a mut ChaCha20Rng,
    recorder: &'a mut Recorder,
    site_label: &'static str,
}

impl<'a> RngDiscipline<'a> {
    pub fn new(rng: &'a mut ChaCha20Rng, recorder: &'a mut Recorder, site_label: &'static str) -> Self {
        RngDiscipline { rng, recorder, site_label }
    }
}

impl RngCore for RngDiscipline<'_> {
    fn next_u32(&mut self) -> u32 {
        self.recorder.record_draw(self.site_label);
        self.rng.next_u32()
    }
    fn next_u64(&mut self) -> u64 {
        self.recorder.record_draw(self.site_label);
        self.rng.next_u64()
    }
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.recorder.record_draw(self.site_label);
        self.rng.fill_bytes(dest)
    }
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.recorder.record_draw(self.site_label);
        self.rng.try_fill_bytes(dest)
    }
}

/// Tracks how many RNG draws happened at each call site over a run, for
/// inclusion in `simulation.log`'s closing summary.
pub struct Recorder {
    seed: u64,
    rng_sites: BTreeMap<&'static str, u64>,
}

impl Recorder {
    pub fn new(seed: u64) -> Self {
        Recorder { seed, rng_sites: BTreeMap::new() }
    }

    pub fn record_draw(&mut self, site_label: &'static str) {
        *self.rng_sites.entry(site_label).or_insert(0) += 1;
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn sites(&self) -> &BTreeMap<&'static str, u64> {
        &self.rng_sites
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn records_one_draw_per_call() {
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let mut recorder = Recorder::new(1);
        {
            let mut disciplined = RngDiscipline::new(&mut rng, &mut recorder, "test.site");
            let _ = disciplined.next_u64();
            let _ = disciplined.next_u64();
        }
        assert_eq!(*recorder.sites().get("test.site").unwrap(), 2);
    }
}
