use std::time::Duration;

/// 面试流程的节奏参数。
#[derive(Debug, Clone)]
pub struct FlowConfig {
    /// 会话记录的最大轮数，达到即收尾。
    pub max_turns: usize,
    /// 每问的倒计时额度（tick 数）。
    pub question_time_limit: u32,
    /// 倒计时 tick 间隔。
    pub tick_interval: Duration,
    /// 逐字显示的单字延迟。
    pub reveal_char_delay: Duration,
    /// 收尾提示展示时长，之后切换到总结页。
    pub auto_close_delay: Duration,
    /// 各通道的缓冲容量。
    pub channel_capacity: usize,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            max_turns: 5,
            question_time_limit: 60,
            tick_interval: Duration::from_secs(1),
            reveal_char_delay: Duration::from_millis(12),
            auto_close_delay: Duration::from_millis(1_200),
            channel_capacity: 32,
        }
    }
}
