//! Exercise and option generation.
//!
//! Distractor sampling is rejection-free: the candidate set is pre-filtered
//! to exclude the correct word, then sampled uniformly without replacement.
//! The correct option's position is drawn uniformly over the option slots.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::constants::OPTIONS_COUNT;
use crate::scheduler::{ExerciseType, Pool};
use crate::store::operations::words::Word;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseOption {
    pub index: usize,
    pub word_id: String,
    /// 阅读题选项：译文 + 图片，不暴露词形
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
    /// 听力 / 口语题选项：词形本身
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub word_id: String,
    #[serde(rename = "type")]
    pub exercise_type: ExerciseType,
    pub options: Vec<ExerciseOption>,
    pub correct_index: usize,
}

/// Practice exercises carry the full word content alongside the question.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PracticeExercise {
    pub word_id: String,
    pub word: String,
    pub translation: String,
    pub image_url: Option<String>,
    pub audio_url: Option<String>,
    pub pool: Pool,
    #[serde(rename = "type")]
    pub exercise_type: ExerciseType,
    pub options: Vec<ExerciseOption>,
    pub correct_index: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WordDetail {
    pub id: String,
    pub word: String,
    pub translation: String,
    pub sentence: Option<String>,
    pub sentence_translation: Option<String>,
    pub image_url: Option<String>,
    pub audio_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pool: Option<Pool>,
}

impl WordDetail {
    pub fn from_word(word: &Word, pool: Option<Pool>) -> Self {
        Self {
            id: word.id.clone(),
            word: word.word.clone(),
            translation: word.translation.clone(),
            sentence: word.sentence.clone(),
            sentence_translation: word.sentence_translation.clone(),
            image_url: word.image_url.clone(),
            audio_url: word.audio_url.clone(),
            pool,
        }
    }
}

fn option_for(word: &Word, index: usize, exercise_type: ExerciseType) -> ExerciseOption {
    if exercise_type.options_show_translation() {
        ExerciseOption {
            index,
            word_id: word.id.clone(),
            translation: Some(word.translation.clone()),
            word: None,
            image_url: word.image_url.clone(),
        }
    } else {
        ExerciseOption {
            index,
            word_id: word.id.clone(),
            translation: None,
            word: Some(word.word.clone()),
            image_url: None,
        }
    }
}

/// Builds the option list: up to three distractors sampled uniformly
/// without replacement from the catalog minus the correct word, with the
/// correct answer at a uniformly drawn index.
pub fn build_options<R: Rng>(
    correct: &Word,
    catalog: &[Word],
    exercise_type: ExerciseType,
    rng: &mut R,
) -> (Vec<ExerciseOption>, usize) {
    let candidates: Vec<&Word> = catalog.iter().filter(|w| w.id != correct.id).collect();
    let distractors: Vec<&&Word> = candidates
        .choose_multiple(rng, OPTIONS_COUNT - 1)
        .collect();

    let option_count = distractors.len() + 1;
    let correct_index = rng.gen_range(0..option_count);

    let mut options = Vec::with_capacity(option_count);
    let mut next_distractor = distractors.into_iter();
    for index in 0..option_count {
        if index == correct_index {
            options.push(option_for(correct, index, exercise_type));
        } else {
            let word = next_distractor.next().expect("distractor count matches");
            options.push(option_for(word, index, exercise_type));
        }
    }

    (options, correct_index)
}

pub fn build_exercise<R: Rng>(
    word: &Word,
    exercise_type: ExerciseType,
    catalog: &[Word],
    rng: &mut R,
) -> Exercise {
    let (options, correct_index) = build_options(word, catalog, exercise_type, rng);
    Exercise {
        word_id: word.id.clone(),
        exercise_type,
        options,
        correct_index,
    }
}

pub fn build_practice_exercise<R: Rng>(
    word: &Word,
    pool: Pool,
    exercise_type: ExerciseType,
    catalog: &[Word],
    rng: &mut R,
) -> PracticeExercise {
    let (options, correct_index) = build_options(word, catalog, exercise_type, rng);
    PracticeExercise {
        word_id: word.id.clone(),
        word: word.word.clone(),
        translation: word.translation.clone(),
        image_url: word.image_url.clone(),
        audio_url: word.audio_url.clone(),
        pool,
        exercise_type,
        options,
        correct_index,
    }
}

/// Distinct exercise types in order of first appearance.
pub fn exercise_order(exercises: &[PracticeExercise]) -> Vec<ExerciseType> {
    let mut seen = Vec::new();
    for exercise in exercises {
        if !seen.contains(&exercise.exercise_type) {
            seen.push(exercise.exercise_type);
        }
    }
    seen
}
