// Intake — turns recorded audio into editable note fields.
// A failed transcription is reported inline, never propagated.

pub mod prompts;

use bytes::Bytes;
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::intake::prompts::{EXTRACT_FIELDS_PROMPT, EXTRACT_TEMPERATURE};
use crate::llm_client::prompts::JSON_ONLY_INSTRUCTION;
use crate::llm_client::{chat_json, LanguageModel};
use crate::models::note::NoteFields;

pub const DEFAULT_AUDIO_NAME: &str = "recording.wav";

/// Outcome of a transcription attempt. Exactly one field is set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transcription {
    pub transcript: Option<String>,
    pub error: Option<String>,
}

pub async fn transcribe_audio(
    model: &dyn LanguageModel,
    audio: Bytes,
    file_name: &str,
) -> Transcription {
    let size = audio.len();
    match model.transcribe(audio, file_name).await {
        Ok(text) => {
            info!("Transcribed {} ({} bytes, {} chars)", file_name, size, text.len());
            Transcription {
                transcript: Some(text),
                error: None,
            }
        }
        Err(e) => {
            warn!("Transcription of {} failed: {}", file_name, e);
            Transcription {
                transcript: None,
                error: Some(format!("Error transcribing audio: {e}")),
            }
        }
    }
}

/// Asks the chat model to split a transcript into the four note fields.
pub async fn extract_fields(
    model: &dyn LanguageModel,
    transcript: &str,
) -> Result<NoteFields, AppError> {
    let prompt = format!(
        "{}\n\n{}",
        EXTRACT_FIELDS_PROMPT.replace("{transcript}", transcript),
        JSON_ONLY_INSTRUCTION
    );
    chat_json::<NoteFields>(model, &prompt, EXTRACT_TEMPERATURE)
        .await
        .map_err(|e| AppError::Llm(format!("Field extraction failed: {e}")))
}
