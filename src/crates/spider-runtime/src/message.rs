//! Payloads carried on an LRT's message queue (§4.6 "Job message").

use spider_core::{ExecConstraint, FifoAttribute, FifoId, PeRef, TaskId};

/// The compiler-synthesized vertex kinds that the dispatcher executes
/// itself rather than resolving through the [`crate::kernel::KernelRegistry`]
/// (§4.3/§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructuralKernel {
    Fork,
    Join,
    Duplicate,
    Head,
    Tail,
    Repeat,
    Init,
    End,
    Send,
    Receive,
}

/// Which kernel a job message targets: a user actor's own registered
/// kernel, named after its PiSDF kernel string, or one of the structural
/// kinds above. The "kernel index" of the original becomes a resolved
/// lookup key rather than a function-pointer-table slot (REDESIGN FLAG,
/// `DESIGN.md`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernelRef {
    User(String),
    Structural(StructuralKernel),
}

/// One FIFO descriptor as carried in a job message: which buffer, how big,
/// and under what aliasing rule (§4.5).
#[derive(Debug, Clone, Copy)]
pub struct FifoDescriptor {
    pub fifo: FifoId,
    pub size: i64,
    pub attribute: FifoAttribute,
}

#[derive(Debug, Clone)]
pub struct JobMessage {
    pub task: TaskId,
    pub exec_index: u32,
    pub kernel: KernelRef,
    pub params_in: Vec<i64>,
    /// Count of output parameters the GRT expects back (always 1 for a
    /// config actor's single DYNAMIC parameter in this workspace, 0
    /// otherwise -- see `DESIGN.md`).
    pub expected_output_params: u32,
    pub inputs: Vec<FifoDescriptor>,
    pub outputs: Vec<FifoDescriptor>,
    pub notify: Vec<PeRef>,
    pub exec_constraints: Vec<ExecConstraint>,
}

#[derive(Debug, Clone)]
pub struct ParamMessage {
    pub task: TaskId,
    pub values: Vec<i64>,
}

/// Reported when a kernel returns `KERNEL_RUNTIME_ERROR` (§7): the owning
/// task is SKIPPED and this is forwarded to the GRT so the iteration's
/// overall status reflects it, without aborting the iteration itself.
#[derive(Debug, Clone)]
pub struct FailureMessage {
    pub task: TaskId,
    pub lrt: PeRef,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct TraceMessage {
    pub task: TaskId,
    pub lrt: PeRef,
    pub start_ns: u64,
    pub end_ns: u64,
}

/// Whatever an LRT or the GRT pushes onto a message queue, ahead of the
/// notification that tells the reader to go fetch it.
#[derive(Debug, Clone)]
pub enum Message {
    Job(JobMessage),
    Param(ParamMessage),
    Failure(FailureMessage),
    Trace(TraceMessage),
}
