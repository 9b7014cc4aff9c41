//! GRT/LRT dispatcher: translates one scheduled, FIFO-allocated single-rate
//! graph into the job/notification protocol of §4.6 and runs it to
//! completion over a pool of `tokio`-spawned LRT reactors.

pub mod bus;
pub mod grt;
pub mod job_stamp;
pub mod kernel;
pub mod lrt;
pub mod message;
pub mod notification;
pub mod pipeline;

pub use bus::{Bus, GrtEvent, GrtInbox, LrtInbox};
pub use grt::IterationReport;
pub use job_stamp::JobStamp;
pub use kernel::{ConstantParamKernel, IdentityKernel, Kernel, KernelRegistry};
pub use message::{FailureMessage, FifoDescriptor, JobMessage, KernelRef, Message, ParamMessage, StructuralKernel, TraceMessage};
pub use notification::{Notification, NotificationKind, Sender};
pub use pipeline::Runtime;
