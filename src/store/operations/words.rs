use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::keys;
use crate::store::{Store, StoreError};

/// Catalog entry. Read-only at serving time; mutated only through the
/// admin import surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Word {
    pub id: String,
    pub word: String,
    pub translation: String,
    pub sentence: Option<String>,
    pub sentence_translation: Option<String>,
    pub image_url: Option<String>,
    pub audio_url: Option<String>,
    pub level: Option<CurriculumTag>,
    pub category: Option<CurriculumTag>,
    /// Catalog insertion order; breaks ties in candidate selection.
    pub seq: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurriculumTag {
    pub label: String,
    pub order: u32,
}

/// Import payload for one word; id and seq are assigned by the store.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordImport {
    pub word: String,
    pub translation: String,
    pub sentence: Option<String>,
    pub sentence_translation: Option<String>,
    pub image_url: Option<String>,
    pub audio_url: Option<String>,
    pub level: Option<CurriculumTag>,
    pub category: Option<CurriculumTag>,
}

impl Store {
    pub fn get_word(&self, word_id: &str) -> Result<Option<Word>, StoreError> {
        let key = keys::word_key(word_id);
        match self.words.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn get_word_by_headword(&self, headword: &str) -> Result<Option<Word>, StoreError> {
        let index_key = keys::headword_index_key(headword);
        let Some(word_id_raw) = self.words.get(index_key.as_bytes())? else {
            return Ok(None);
        };
        let word_id = match String::from_utf8(word_id_raw.to_vec()) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid UTF-8 in headword index");
                return Ok(None);
            }
        };
        self.get_word(&word_id)
    }

    /// Full catalog in insertion order.
    pub fn list_words(&self) -> Result<Vec<Word>, StoreError> {
        let mut words = Vec::new();
        for item in self.words.iter() {
            let (k, v) = item?;
            if k.starts_with(b"headword:") {
                continue;
            }
            words.push(Self::deserialize::<Word>(&v)?);
        }
        words.sort_by_key(|w| w.seq);
        Ok(words)
    }

    pub fn count_words(&self) -> Result<u64, StoreError> {
        let mut count = 0u64;
        for item in self.words.iter() {
            let (k, _) = item?;
            if !k.starts_with(b"headword:") {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Bulk import, skipping entries whose headword already exists.
    /// Returns (imported, skipped).
    pub fn import_words(
        &self,
        imports: &[WordImport],
        now: DateTime<Utc>,
    ) -> Result<(u32, u32), StoreError> {
        let mut imported = 0u32;
        let mut skipped = 0u32;

        for entry in imports {
            if self.get_word_by_headword(&entry.word)?.is_some() {
                skipped += 1;
                continue;
            }

            let word = Word {
                id: uuid::Uuid::new_v4().to_string(),
                word: entry.word.clone(),
                translation: entry.translation.clone(),
                sentence: entry.sentence.clone(),
                sentence_translation: entry.sentence_translation.clone(),
                image_url: entry.image_url.clone(),
                audio_url: entry.audio_url.clone(),
                level: entry.level.clone(),
                category: entry.category.clone(),
                seq: self.next_sequence()?,
                created_at: now,
            };

            let key = keys::word_key(&word.id);
            let index_key = keys::headword_index_key(&word.word);
            self.words.insert(key.as_bytes(), Self::serialize(&word)?)?;
            self.words
                .insert(index_key.as_bytes(), word.id.as_bytes())?;
            imported += 1;
        }

        Ok((imported, skipped))
    }
}
