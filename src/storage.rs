//! 永続化レイヤー。
//!
//! ## 方針
//!
//! - 保存対象は `PersistedState` ひとつだけ。1 つのキーに JSON として丸ごと書く。
//! - 読み込みは「修復しながら読む」。キーが無い、あるいはパースに失敗した場合は
//!   デフォルト状態を書き戻して返す。パースエラーは呼び出し側に伝播させない。
//! - 書き込み失敗（容量超過など）はコンソールに警告を出して握りつぶす。
//! - 各ストア操作は load → メモリ上で変更 → save を 1 単位とする。
//!   タブ間の同時書き込みは考慮しない（後勝ち）。

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::console;
use crate::constants::STORAGE_KEY;
use crate::error::StorageError;
use crate::model::PersistedState;

/// 文字列キー・文字列値のストレージ。localStorage と同じ形。
pub trait StorageBackend {
    fn get_item(&self, key: &str) -> Option<String>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove_item(&self, key: &str);
}

/// テスト・ネイティブ実行用のインメモリ実装。
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageBackend for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) {
        self.items.borrow_mut().remove(key);
    }
}

/// ブラウザの localStorage。WASM 環境でのみ動作。
#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    /// localStorage が使えない環境（プライベートモード等）では None。
    pub fn open() -> Option<Self> {
        let storage = web_sys::window()?.local_storage().ok()??;
        Some(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
impl StorageBackend for LocalStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| StorageError::Backend(format!("{e:?}")))
    }

    fn remove_item(&self, key: &str) {
        let _ = self.storage.remove_item(key);
    }
}

/// 永続化ハンドル。ストア同士で共有するため `Clone` は同じバックエンドを指す。
#[derive(Clone)]
pub struct Persistence {
    backend: Rc<dyn StorageBackend>,
    key: String,
}

impl Persistence {
    pub fn new(backend: Rc<dyn StorageBackend>) -> Self {
        Self::with_key(backend, STORAGE_KEY)
    }

    pub fn with_key(backend: Rc<dyn StorageBackend>, key: &str) -> Self {
        Self {
            backend,
            key: key.to_string(),
        }
    }

    /// 状態を読み込む。無い・壊れている場合はデフォルトを書き込んで返す。
    pub fn load(&self) -> PersistedState {
        let json = match self.backend.get_item(&self.key) {
            Some(j) => j,
            None => return self.reset(),
        };

        let mut state: PersistedState = match serde_json::from_str(&json) {
            Ok(s) => s,
            Err(e) => {
                console::warn(&format!(
                    "Shell Pack Booster: セーブデータのパースに失敗（初期化します）: {e}"
                ));
                return self.reset();
            }
        };

        if state.migrate_legacy() {
            console::log("Shell Pack Booster: 旧形式の activeTimers をマイグレーションしました。");
            self.save(&state);
        }
        state
    }

    /// 状態を丸ごと上書きする。失敗時は警告のみ。
    pub fn save(&self, state: &PersistedState) {
        if let Err(e) = self.try_save(state) {
            console::warn(&format!("Shell Pack Booster: 保存に失敗: {e}"));
        }
    }

    fn try_save(&self, state: &PersistedState) -> Result<(), StorageError> {
        let json = serde_json::to_string(state)?;
        self.backend.set_item(&self.key, &json)
    }

    fn reset(&self) -> PersistedState {
        let state = PersistedState::default();
        self.save(&state);
        state
    }

    /// 保存データを削除する。次の `load` でデフォルトが作られる。
    pub fn delete(&self) {
        self.backend.remove_item(&self.key);
    }
}
