//! 语音能力接入层。

use anyhow::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::warn;

/// 宿主环境的语音能力。由上层注入，不做全局引用。
///
/// 不支持语音的环境提供 no-op 实现，语音失败永远不致命。
#[async_trait]
pub trait SpeechCapability: Send + Sync {
    fn is_supported(&self) -> bool;

    /// 启动一次语音识别并等待其结束，返回识别出的文本（可能为空）。
    async fn capture_once(&self) -> Result<Option<String>>;

    /// 朗读一段文本。
    async fn speak(&self, text: &str) -> Result<()>;
}

/// 无语音环境的占位实现：告警后静默通过。
#[derive(Debug, Default)]
pub struct UnsupportedSpeech;

#[async_trait]
impl SpeechCapability for UnsupportedSpeech {
    fn is_supported(&self) -> bool {
        false
    }

    async fn capture_once(&self) -> Result<Option<String>> {
        warn!(
            target: "speech",
            "speech recognition is not supported in this environment"
        );
        Ok(None)
    }

    async fn speak(&self, _text: &str) -> Result<()> {
        warn!(
            target: "speech",
            "speech synthesis is not supported in this environment"
        );
        Ok(())
    }
}

/// 预置脚本的语音实现，用于测试与演示。
#[derive(Debug, Default)]
pub struct ScriptedSpeech {
    transcripts: Mutex<VecDeque<String>>,
    spoken: Mutex<Vec<String>>,
}

impl ScriptedSpeech {
    pub fn new(transcripts: Vec<&str>) -> Self {
        Self {
            transcripts: Mutex::new(transcripts.into_iter().map(String::from).collect()),
            spoken: Mutex::new(Vec::new()),
        }
    }

    /// 已朗读文本的快照。
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().expect("spoken lock poisoned").clone()
    }
}

#[async_trait]
impl SpeechCapability for ScriptedSpeech {
    fn is_supported(&self) -> bool {
        true
    }

    async fn capture_once(&self) -> Result<Option<String>> {
        Ok(self
            .transcripts
            .lock()
            .expect("transcripts lock poisoned")
            .pop_front())
    }

    async fn speak(&self, text: &str) -> Result<()> {
        self.spoken
            .lock()
            .expect("spoken lock poisoned")
            .push(text.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unsupported_speech_is_a_noop() {
        let speech = UnsupportedSpeech;

        assert!(!speech.is_supported());
        assert_eq!(speech.capture_once().await.expect("capture is ok"), None);
        speech.speak("hello").await.expect("speak is ok");
    }

    #[tokio::test]
    async fn scripted_speech_pops_transcripts_in_order() {
        let speech = ScriptedSpeech::new(vec!["first", "second"]);

        assert_eq!(
            speech.capture_once().await.expect("capture is ok"),
            Some("first".into())
        );
        assert_eq!(
            speech.capture_once().await.expect("capture is ok"),
            Some("second".into())
        );
        assert_eq!(speech.capture_once().await.expect("capture is ok"), None);
    }

    #[tokio::test]
    async fn scripted_speech_records_spoken_text() {
        let speech = ScriptedSpeech::default();

        speech.speak("Tell me about yourself.").await.expect("speak is ok");

        assert_eq!(speech.spoken(), vec!["Tell me about yourself.".to_string()]);
    }
}
