use thiserror::Error;

/// 工具的结构化错误分类
///
/// 三类错误都是终止性的：不在内部重试，统一向上传播，
/// 由 CLI 边界打印并以区别于 0/1 的退出码结束进程。
#[derive(Debug, Error)]
pub enum GemDiffError {
    /// 下载 gem 归档失败（网络错误或非 200 状态码）
    #[error("下载 {gem_name} {version} 失败: {reason}")]
    Retrieval {
        gem_name: String,
        version: String,
        reason: String,
    },

    /// gem 归档无法解析（格式损坏、缺少内层条目、写出失败等）
    #[error("解析 gem 归档失败: {0}")]
    Archive(String),

    /// 外部 diff 命令缺失或以意外状态退出
    #[error("生成差异失败: {0}")]
    Comparison(String),
}
