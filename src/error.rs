//! 取樣核心的錯誤分類
//!
//! 呼叫端可依錯誤種類區分「輸入錯誤」與「外部工具失敗」，
//! 例如輸入錯誤時重新詢問，外部工具失敗時直接中止。

use std::path::PathBuf;

/// 外部協作者回傳的錯誤（保留原始錯誤鏈）
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, thiserror::Error)]
pub enum SamplerError {
    #[error("參數不合法 {name}: {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("無法取得影片長度: {}", path.display())]
    ProbeFailed {
        path: PathBuf,
        #[source]
        source: CollaboratorError,
    },

    #[error("片段 {index} 擷取失敗")]
    ClipExtractionFailed {
        index: usize,
        #[source]
        source: CollaboratorError,
    },

    #[error("片段合併失敗")]
    ConcatenationFailed {
        #[source]
        source: CollaboratorError,
    },

    #[error("取樣計畫為空，沒有可擷取的片段")]
    EmptyPlan,

    #[error("操作已取消")]
    Cancelled,
}

impl SamplerError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }

    /// 空計畫不視為失敗，由呼叫端決定如何呈現
    #[must_use]
    pub const fn is_benign(&self) -> bool {
        matches!(self, Self::EmptyPlan)
    }

    /// 是否為使用者輸入造成的錯誤
    #[must_use]
    pub const fn is_input_error(&self) -> bool {
        matches!(self, Self::InvalidParameter { .. })
    }
}

pub type SamplerResult<T> = Result<T, SamplerError>;
