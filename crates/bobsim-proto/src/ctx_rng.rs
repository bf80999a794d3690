//! # bobsim-proto::ctx_rng
//!
//! Adapts `NodeCtx`'s two disciplined draw methods (`rand_f64`/`rand_u64`)
//! into a full `rand::RngCore` source, so behaviors can sample from
//! `rand_distr` distributions (Normal, Exp, Uniform, ...) instead of hand
//! rolling inverse-CDF math. Every draw still goes through the engine's
//! recorder-backed `NodeCtx` methods, so distribution sampling stays
//! reproducible under a fixed seed exactly like a plain `rand_f64` draw.

use crate::ctx::NodeCtx;
use rand::RngCore;

pub struct CtxRng<'a> {
    ctx: &'a mut dyn NodeCtx,
}

impl<'a> CtxRng<'a> {
    pub fn new(ctx: &'a mut dyn NodeCtx) -> Self {
        CtxRng { ctx }
    }
}

impl RngCore for CtxRng<'_> {
    fn next_u32(&mut self) -> u32 {
        self.ctx.rand_u64() as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.ctx.rand_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let mut chunks = dest.chunks_exact_mut(8);
        for chunk in &mut chunks {
            chunk.copy_from_slice(&self.ctx.rand_u64().to_le_bytes());
        }
        let remainder = chunks.into_remainder();
        if !remainder.is_empty() {
            let bytes = self.ctx.rand_u64().to_le_bytes();
            remainder.copy_from_slice(&bytes[..remainder.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
