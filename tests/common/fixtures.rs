use chrono::Utc;

use vocab_backend::store::operations::words::{CurriculumTag, WordImport};
use vocab_backend::store::Store;

pub fn word_import(word: &str, translation: &str) -> WordImport {
    WordImport {
        word: word.to_string(),
        translation: translation.to_string(),
        sentence: Some(format!("An example sentence with {}.", word)),
        sentence_translation: Some(format!("包含 {} 的例句。", word)),
        image_url: Some(format!("/images/{}.jpg", word)),
        audio_url: Some(format!("/audio/{}.mp3", word)),
        level: None,
        category: None,
    }
}

pub fn word_import_at(
    word: &str,
    translation: &str,
    level: u32,
    category: u32,
) -> WordImport {
    let mut import = word_import(word, translation);
    import.level = Some(CurriculumTag {
        label: format!("Level {}", level),
        order: level,
    });
    import.category = Some(CurriculumTag {
        label: format!("Category {}", category),
        order: category,
    });
    import
}

/// Seeds `count` untagged words and returns their ids in insertion order.
pub fn seed_catalog(store: &Store, count: usize) -> Vec<String> {
    let imports: Vec<WordImport> = (0..count)
        .map(|i| word_import(&format!("word-{:03}", i), &format!("译文-{:03}", i)))
        .collect();
    store.import_words(&imports, Utc::now()).expect("seed catalog");

    store
        .list_words()
        .expect("list words")
        .into_iter()
        .map(|w| w.id)
        .collect()
}

pub fn seed_tutorial_words(store: &Store) {
    let imports = vec![
        word_import("apple", "苹果"),
        word_import("banana", "香蕉"),
        word_import("grape", "葡萄"),
        word_import("mango", "芒果"),
    ];
    store.import_words(&imports, Utc::now()).expect("seed tutorial words");
}
