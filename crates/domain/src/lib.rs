//! 聊天室核心领域模型
//!
//! 包含参与者、消息两类实体，以及名称校验、可见性规则和输入清洗。

pub mod errors;
pub mod message;
pub mod participant;
pub mod sanitize;
pub mod value_objects;

// 重新导出常用类型
pub use errors::*;
pub use message::*;
pub use participant::*;
pub use value_objects::*;
