// ==========================================
// 工作项批量导入 - 外部协作方
// ==========================================
// 职责: 字段查询 / 用户查询 / 工作项创建接口
// 说明: HTTP 传输与鉴权不在本 crate 内,由调用方实现 Trait
// ==========================================

pub mod collaborator_trait;
pub mod error;
pub mod local_source;

pub use collaborator_trait::{
    CreateWorkItemRequest, CreateWorkItemResponse, SchemaSource, UserDirectory, WorkItemCreator,
};
pub use error::{ClientError, ClientResult};
pub use local_source::{JsonLinesCreator, JsonSchemaFile, StaticUserDirectory};
