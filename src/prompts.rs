//! Fixed prompt and display strings.
//!
//! Pure constant data: the system instruction that seeds every session, the
//! welcome banner, and the canned error strings.  The conversation store
//! depends on [`system_prompt`] to seed new sessions.

use crate::types::Message;

/// The system instruction given to the model.  Never shown to the student.
pub const SYSTEM_PROMPT: &str = "你是一位专业的英语老师AI助手，专门帮助中国学生学习英语。\
你具备以下特点：\n\
1. 用清晰易懂的中文解释英语知识点\n\
2. 耐心细致，适合初中和高中学生的理解水平\n\
3. 能够提供语法讲解、词汇解析、句子润色等全方位帮助\n\
4. 鼓励学生多练习，给出建设性的学习建议\n\
5. 能够根据学生的问题深入浅出地进行解答\n\n\
请始终保持友善、专业的教学风格。";

/// Welcome banner printed when a session starts.
pub const WELCOME_MESSAGE: &str = "欢迎使用EduLingo英语学习助手！🎓\n\n\
我是您的专属英语老师AI，可以帮助您：\n\
📚 语法知识讲解\n\
📝 词汇用法分析\n\
✍️ 句子润色改进\n\
🗣️ 英语表达指导\n\n\
请随时向我提问，我会用中文为您详细解答！";

/// Canned string for a rejected credential.
pub const AUTH_ERROR: &str = "API密钥无效，请检查配置文件中的api_key";

/// Canned string for remote throttling.
pub const RATE_LIMIT_ERROR: &str = "API调用频率限制，请稍后重试";

/// Canned string for configuration problems.
pub const CONFIG_ERROR: &str = "配置文件有误，请检查config.json文件。";

/// Canned string for network problems.
pub const NETWORK_ERROR: &str = "网络连接失败，请检查网络设置和代理配置";

/// Returns the system message that seeds a fresh session.
pub fn system_prompt() -> Message {
    Message::system(SYSTEM_PROMPT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Role;

    #[test]
    fn system_prompt_has_system_role() {
        let msg = system_prompt();
        assert_eq!(msg.role, Role::System);
        assert!(!msg.content.is_empty());
    }

    #[test]
    fn system_prompt_is_stable() {
        assert_eq!(system_prompt(), system_prompt());
    }
}
