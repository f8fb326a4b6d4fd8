use chrono::{DateTime, Utc};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use ulid::Ulid;

/// 进程内笔记存储
pub static NOTES: Lazy<NoteStore> = Lazy::new(NoteStore::default);

#[derive(Debug, Clone, Serialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip)]
    seq: u64,
}

#[derive(Default)]
pub struct NoteStore {
    notes: DashMap<String, Note>,
    next_seq: AtomicU64,
}

impl NoteStore {
    pub fn create(&self, title: String, body: String) -> Note {
        let now = Utc::now();
        let note = Note {
            id: Ulid::new().to_string(),
            title,
            body,
            created_at: now,
            updated_at: now,
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
        };
        self.notes.insert(note.id.clone(), note.clone());
        note
    }

    pub fn get(&self, id: &str) -> Option<Note> {
        self.notes.get(id).map(|note| note.value().clone())
    }

    pub fn update(&self, id: &str, title: Option<String>, body: Option<String>) -> Option<Note> {
        let mut note = self.notes.get_mut(id)?;
        if let Some(title) = title {
            note.title = title;
        }
        if let Some(body) = body {
            note.body = body;
        }
        note.updated_at = Utc::now();
        Some(note.clone())
    }

    /// 按创建顺序列出，`search` 对标题做大小写不敏感的包含匹配
    pub fn list(&self, search: Option<&str>) -> Vec<Note> {
        let needle = search.map(str::to_lowercase);
        let mut notes: Vec<Note> = self
            .notes
            .iter()
            .filter(|entry| match &needle {
                Some(needle) => entry.title.to_lowercase().contains(needle.as_str()),
                None => true,
            })
            .map(|entry| entry.value().clone())
            .collect();
        notes.sort_by_key(|note| note.seq);
        notes
    }
}
