//! Transcript assembly from recognizer results

/// One recognizer hypothesis
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionSegment {
    pub transcript: String,
    pub is_final: bool,
}

impl RecognitionSegment {
    pub fn interim(text: impl Into<String>) -> Self {
        Self {
            transcript: text.into(),
            is_final: false,
        }
    }

    pub fn finalized(text: impl Into<String>) -> Self {
        Self {
            transcript: text.into(),
            is_final: true,
        }
    }
}

/// A result callback from a continuous recognizer.
/// `results` holds every segment so far; `result_index` is the first changed one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecognitionEvent {
    pub result_index: usize,
    pub results: Vec<RecognitionSegment>,
}

/// Concatenate the final segments from `result_index` on.
/// Returns None when nothing was finalized.
pub fn finalized_transcript(event: &RecognitionEvent) -> Option<String> {
    let text: String = event
        .results
        .iter()
        .skip(event.result_index)
        .filter(|segment| segment.is_final)
        .map(|segment| segment.transcript.as_str())
        .collect();

    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}
