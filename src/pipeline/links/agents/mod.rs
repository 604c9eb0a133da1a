//! links流水线的agent定义
//!
//! 每个agent是一份无状态配置：模型档位、指令、挂载的工具。
//! 运行时对象每次调用前重新构建。

pub mod client_link;
pub mod client_mention;
pub mod images;
pub mod internal_links;
pub mod link_requests;
pub mod url_suggestion;
