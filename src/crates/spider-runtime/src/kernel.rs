//! Kernel contract and the structural (compiler-synthesized) kernels that
//! implement FORK/JOIN/DUPLICATE/HEAD/TAIL/REPEAT/INIT/END/SEND/RECEIVE.
//!
//! Grounded on the "Kernel signature" of §6: `void kernel(paramsIn,
//! paramsOut, inputFifos, outputFifos)`. The `Arc<dyn Kernel>` registry
//! resolved by a string id replaces the original's function-pointer table
//! (REDESIGN FLAG, `DESIGN.md`).
//!
//! **Simplification** (`DESIGN.md`): a job's input/output buffers are
//! allocated fresh here, sized to the FIFO descriptor, rather than backed
//! by the shared virtual-address arena [`spider_core::FifoPlan`] computes.
//! This keeps kernel execution decoupled from a real memory allocator while
//! still exercising the dispatch protocol, job-stamp ordering and parameter
//! feedback loop end to end.

use crate::message::{JobMessage, KernelRef, StructuralKernel};
use spider_types::error::{Error, Result};
use std::collections::HashMap;
use std::sync::Arc;

pub trait Kernel: Send + Sync {
    /// Runs one firing. `inputs[i]` is read-ready, sized to the declared
    /// input rate; `outputs[i]` arrives zero-filled, sized to the declared
    /// output rate. Returns the parameters a config kernel produces (empty
    /// for an ordinary data kernel).
    fn call(&self, params_in: &[i64], inputs: &[Vec<u8>], outputs: &mut [Vec<u8>]) -> Result<Vec<i64>>;
}

#[derive(Default)]
pub struct KernelRegistry {
    kernels: HashMap<String, Arc<dyn Kernel>>,
}

impl KernelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: impl Into<String>, kernel: Arc<dyn Kernel>) {
        self.kernels.insert(id.into(), kernel);
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Kernel>> {
        self.kernels.get(id).cloned()
    }
}

/// Copies as much of `src` into `dst` as both sizes allow, leaving the rest
/// of `dst` at its original (zero-filled) value.
fn copy_clamped(dst: &mut [u8], src: &[u8]) {
    let n = dst.len().min(src.len());
    dst[..n].copy_from_slice(&src[..n]);
}

fn run_structural(kind: StructuralKernel, inputs: &[Vec<u8>], outputs: &mut [Vec<u8>]) -> Result<Vec<i64>> {
    match kind {
        StructuralKernel::Fork => {
            let src = inputs.first().map(Vec::as_slice).unwrap_or(&[]);
            let mut offset = 0usize;
            for out in outputs.iter_mut() {
                let end = (offset + out.len()).min(src.len());
                if offset < end {
                    copy_clamped(out, &src[offset..end]);
                }
                offset += out.len();
            }
        }
        StructuralKernel::Join => {
            let out = outputs.first_mut().ok_or_else(|| Error::Validation("join has no output fifo".to_string()))?;
            let mut offset = 0usize;
            for src in inputs {
                let end = (offset + src.len()).min(out.len());
                if offset < end {
                    out[offset..end].copy_from_slice(&src[..end - offset]);
                }
                offset += src.len();
            }
        }
        StructuralKernel::Duplicate => {
            let src = inputs.first().map(Vec::as_slice).unwrap_or(&[]);
            for out in outputs.iter_mut() {
                copy_clamped(out, src);
            }
        }
        StructuralKernel::Head => {
            let src = inputs.first().map(Vec::as_slice).unwrap_or(&[]);
            if let Some(out) = outputs.first_mut() {
                copy_clamped(out, src);
            }
        }
        StructuralKernel::Tail => {
            let src = inputs.first().map(Vec::as_slice).unwrap_or(&[]);
            if let Some(out) = outputs.first_mut() {
                let n = out.len().min(src.len());
                out[..n].copy_from_slice(&src[src.len() - n..]);
            }
        }
        StructuralKernel::Repeat => {
            let src = inputs.first().map(Vec::as_slice).unwrap_or(&[]);
            if let Some(out) = outputs.first_mut() {
                if !src.is_empty() {
                    for (i, b) in out.iter_mut().enumerate() {
                        *b = src[i % src.len()];
                    }
                }
            }
        }
        // INIT produces a self-loop delay's initial tokens (modeled as the
        // zero-fill the output buffer already carries); END consumes a
        // self-loop's final tokens and writes nothing further.
        StructuralKernel::Init | StructuralKernel::End => {}
        StructuralKernel::Send | StructuralKernel::Receive => {
            let src = inputs.first().map(Vec::as_slice).unwrap_or(&[]);
            if let Some(out) = outputs.first_mut() {
                copy_clamped(out, src);
            }
        }
    }
    Ok(Vec::new())
}

/// Allocates fresh input/output buffers for `job` and runs its kernel,
/// dispatching to either a registered user kernel or a built-in structural
/// one.
pub fn run_kernel(job: &JobMessage, registry: &KernelRegistry) -> Result<Vec<i64>> {
    let inputs: Vec<Vec<u8>> = job.inputs.iter().map(|d| vec![0u8; d.size.max(0) as usize]).collect();
    let mut outputs: Vec<Vec<u8>> = job.outputs.iter().map(|d| vec![0u8; d.size.max(0) as usize]).collect();
    match &job.kernel {
        KernelRef::User(name) => {
            let kernel = registry.get(name).ok_or_else(|| Error::Validation(format!("no kernel registered for '{name}'")))?;
            kernel.call(&job.params_in, &inputs, &mut outputs)
        }
        KernelRef::Structural(kind) => run_structural(*kind, &inputs, &mut outputs),
    }
}

/// Copies its single input to its single output unchanged; a stand-in data
/// kernel for actors whose behavior does not matter to the dispatcher
/// tests/demo.
pub struct IdentityKernel;

impl Kernel for IdentityKernel {
    fn call(&self, _params_in: &[i64], inputs: &[Vec<u8>], outputs: &mut [Vec<u8>]) -> Result<Vec<i64>> {
        if let (Some(src), Some(dst)) = (inputs.first(), outputs.first_mut()) {
            copy_clamped(dst, src);
        }
        Ok(Vec::new())
    }
}

/// A config kernel that always reports the same fixed parameter value(s),
/// for driving the dynamic-parameter feedback loop in tests/demos without a
/// real sensor or computation behind it.
pub struct ConstantParamKernel {
    pub values: Vec<i64>,
}

impl Kernel for ConstantParamKernel {
    fn call(&self, _params_in: &[i64], _inputs: &[Vec<u8>], _outputs: &mut [Vec<u8>]) -> Result<Vec<i64>> {
        Ok(self.values.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fork_splits_input_across_outputs_in_order() {
        let inputs = vec![vec![1, 2, 3, 4, 5, 6, 7, 8]];
        let mut outputs = vec![vec![0u8; 3], vec![0u8; 5]];
        run_structural(StructuralKernel::Fork, &inputs, &mut outputs).unwrap();
        assert_eq!(outputs[0], vec![1, 2, 3]);
        assert_eq!(outputs[1], vec![4, 5, 6, 7, 8]);
    }

    #[test]
    fn join_concatenates_inputs_in_order() {
        let inputs = vec![vec![1, 2], vec![3, 4, 5]];
        let mut outputs = vec![vec![0u8; 5]];
        run_structural(StructuralKernel::Join, &inputs, &mut outputs).unwrap();
        assert_eq!(outputs[0], vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn duplicate_copies_input_to_every_output() {
        let inputs = vec![vec![9, 9]];
        let mut outputs = vec![vec![0u8; 2], vec![0u8; 2]];
        run_structural(StructuralKernel::Duplicate, &inputs, &mut outputs).unwrap();
        assert_eq!(outputs[0], vec![9, 9]);
        assert_eq!(outputs[1], vec![9, 9]);
    }

    #[test]
    fn constant_param_kernel_reports_its_fixed_values() {
        let kernel = ConstantParamKernel { values: vec![5] };
        let out = kernel.call(&[], &[], &mut []).unwrap();
        assert_eq!(out, vec![5]);
    }
}
