//! 应用层实现。
//!
//! 这里提供围绕领域模型的用例服务，处理输入校验、参与者在场检查，
//! 以及对存储适配器和时钟的抽象。

pub mod clock;
pub mod dto;
pub mod error;
pub mod reaper;
pub mod repository;
pub mod services;

pub use clock::{wall_clock_label, Clock, ManualClock, SystemClock};
pub use dto::{MessageDto, ParticipantDto};
pub use error::ApplicationError;
pub use reaper::{IdleReaper, IdleReaperDependencies, ReaperHandle, ReaperSettings};
pub use repository::{MessageRepository, ParticipantRepository};
pub use services::{
    MessageService, MessageServiceDependencies, ParticipantService,
    ParticipantServiceDependencies, PostMessageRequest, RegisterParticipantRequest,
};
