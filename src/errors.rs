use std::fmt;

use actix_web::http::StatusCode;

#[derive(Debug, Clone)]
pub enum SnaplinkError {
    Validation(String),
    Conflict(String),
    NotFound(String),
    Expired(String),
    Unauthorized(String),
    Server(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Serialization(String),
    DateParse(String),
}

impl SnaplinkError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            SnaplinkError::Validation(_) => "E001",
            SnaplinkError::Conflict(_) => "E002",
            SnaplinkError::NotFound(_) => "E003",
            SnaplinkError::Expired(_) => "E004",
            SnaplinkError::Unauthorized(_) => "E005",
            SnaplinkError::Server(_) => "E006",
            SnaplinkError::DatabaseConfig(_) => "E007",
            SnaplinkError::DatabaseConnection(_) => "E008",
            SnaplinkError::DatabaseOperation(_) => "E009",
            SnaplinkError::FileOperation(_) => "E010",
            SnaplinkError::Serialization(_) => "E011",
            SnaplinkError::DateParse(_) => "E012",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            SnaplinkError::Validation(_) => "Validation Error",
            SnaplinkError::Conflict(_) => "Conflict",
            SnaplinkError::NotFound(_) => "Resource Not Found",
            SnaplinkError::Expired(_) => "Link Expired",
            SnaplinkError::Unauthorized(_) => "Unauthorized",
            SnaplinkError::Server(_) => "Server Error",
            SnaplinkError::DatabaseConfig(_) => "Database Configuration Error",
            SnaplinkError::DatabaseConnection(_) => "Database Connection Error",
            SnaplinkError::DatabaseOperation(_) => "Database Operation Error",
            SnaplinkError::FileOperation(_) => "File Operation Error",
            SnaplinkError::Serialization(_) => "Serialization Error",
            SnaplinkError::DateParse(_) => "Date Parse Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            SnaplinkError::Validation(msg)
            | SnaplinkError::Conflict(msg)
            | SnaplinkError::NotFound(msg)
            | SnaplinkError::Expired(msg)
            | SnaplinkError::Unauthorized(msg)
            | SnaplinkError::Server(msg)
            | SnaplinkError::DatabaseConfig(msg)
            | SnaplinkError::DatabaseConnection(msg)
            | SnaplinkError::DatabaseOperation(msg)
            | SnaplinkError::FileOperation(msg)
            | SnaplinkError::Serialization(msg)
            | SnaplinkError::DateParse(msg) => msg,
        }
    }

    /// HTTP 状态码映射
    ///
    /// 冲突沿用 400 而不是 409，客户端按 `success=false` 判断即可。
    pub fn http_status(&self) -> StatusCode {
        match self {
            SnaplinkError::Validation(_) | SnaplinkError::Conflict(_) => StatusCode::BAD_REQUEST,
            SnaplinkError::NotFound(_) => StatusCode::NOT_FOUND,
            SnaplinkError::Expired(_) => StatusCode::GONE,
            SnaplinkError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            SnaplinkError::Server(_)
            | SnaplinkError::DatabaseConfig(_)
            | SnaplinkError::DatabaseConnection(_)
            | SnaplinkError::DatabaseOperation(_)
            | SnaplinkError::FileOperation(_)
            | SnaplinkError::Serialization(_)
            | SnaplinkError::DateParse(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 是否为服务端内部错误（响应中不回显细节）
    pub fn is_internal(&self) -> bool {
        self.http_status().is_server_error()
    }

    /// 面向客户端的消息
    pub fn public_message(&self) -> &str {
        if self.is_internal() {
            "Server error"
        } else {
            self.message()
        }
    }

    /// 格式化为彩色输出（用于启动失败时的终端输出）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for SnaplinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for SnaplinkError {}

// 便捷的构造函数
impl SnaplinkError {
    pub fn validation<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::Validation(msg.into())
    }

    pub fn conflict<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::Conflict(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::NotFound(msg.into())
    }

    pub fn expired<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::Expired(msg.into())
    }

    pub fn unauthorized<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::Unauthorized(msg.into())
    }

    pub fn server<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::Server(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::FileOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::Serialization(msg.into())
    }

    pub fn date_parse<T: Into<String>>(msg: T) -> Self {
        SnaplinkError::DateParse(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for SnaplinkError {
    fn from(err: sea_orm::DbErr) -> Self {
        SnaplinkError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for SnaplinkError {
    fn from(err: std::io::Error) -> Self {
        SnaplinkError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for SnaplinkError {
    fn from(err: serde_json::Error) -> Self {
        SnaplinkError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for SnaplinkError {
    fn from(err: chrono::ParseError) -> Self {
        SnaplinkError::DateParse(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for SnaplinkError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        SnaplinkError::Unauthorized(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SnaplinkError>;
