//! ホスト連携
//!
//! 検索ボックスを開けるかの判定と、非同期に解決されるアダプタの鮮度確認を提供

use crate::document::{DocumentId, DocumentKind};
use crate::error::{FindError, Result};

/// ホストが管理する「現在アクティブなノート」
pub trait ActiveDocument {
    /// ノートの識別子
    fn document_id(&self) -> DocumentId;

    /// ノート種別
    fn kind(&self) -> DocumentKind;

    /// 読み取り専用か
    fn is_read_only(&self) -> bool;
}

/// 検索対象にできるかを判定する
///
/// 書き込み可能な plain / rich ドキュメントのみ受け付ける
pub fn open_gate<H: ActiveDocument + ?Sized>(active: &H) -> Result<DocumentKind> {
    let kind = active.kind();
    if !kind.is_searchable() {
        return Err(FindError::invalid_kind(kind));
    }
    if active.is_read_only() {
        return Err(FindError::ReadOnlyDocument);
    }
    Ok(kind)
}

/// アダプタ解決要求の控え
///
/// 解決結果が届いたとき、要求時と同じドキュメント・同じセッション世代かを確認する
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterRequest {
    document: DocumentId,
    kind: DocumentKind,
    generation: u64,
}

impl AdapterRequest {
    pub(crate) fn new(document: DocumentId, kind: DocumentKind, generation: u64) -> Self {
        Self {
            document,
            kind,
            generation,
        }
    }

    /// 要求したドキュメント
    pub fn document(&self) -> DocumentId {
        self.document
    }

    /// 要求したドキュメント種別
    pub fn kind(&self) -> &DocumentKind {
        &self.kind
    }

    /// 要求時のセッション世代
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 解決結果がまだ有効か確認する
    pub fn check(&self, active: DocumentId, resolved: DocumentId, generation: u64) -> Result<()> {
        if active != self.document || resolved != self.document || generation != self.generation {
            return Err(FindError::StaleAsyncResult {
                requested: self.document,
                active,
            });
        }
        Ok(())
    }
}

/// 単純なノート情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteInfo {
    pub id: DocumentId,
    pub kind: DocumentKind,
    pub read_only: bool,
}

impl NoteInfo {
    pub fn new(id: DocumentId, kind: DocumentKind) -> Self {
        Self {
            id,
            kind,
            read_only: false,
        }
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

impl ActiveDocument for NoteInfo {
    fn document_id(&self) -> DocumentId {
        self.id
    }

    fn kind(&self) -> DocumentKind {
        self.kind.clone()
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_accepts_writable_plain_and_rich() {
        let plain = NoteInfo::new(DocumentId::new(1), DocumentKind::Plain);
        let rich = NoteInfo::new(DocumentId::new(2), DocumentKind::Rich);
        assert_eq!(open_gate(&plain).unwrap(), DocumentKind::Plain);
        assert_eq!(open_gate(&rich).unwrap(), DocumentKind::Rich);
    }

    #[test]
    fn gate_rejects_read_only() {
        let note = NoteInfo::new(DocumentId::new(1), DocumentKind::Plain).read_only();
        assert!(matches!(open_gate(&note), Err(FindError::ReadOnlyDocument)));
    }

    #[test]
    fn gate_rejects_other_types() {
        let note = NoteInfo::new(DocumentId::new(1), DocumentKind::Other("canvas".into()));
        assert!(matches!(
            open_gate(&note),
            Err(FindError::InvalidDocumentType { .. })
        ));
    }

    #[test]
    fn request_detects_note_switch() {
        let request = AdapterRequest::new(DocumentId::new(1), DocumentKind::Rich, 4);
        assert_eq!(request.kind(), &DocumentKind::Rich);
        assert!(request
            .check(DocumentId::new(1), DocumentId::new(1), 4)
            .is_ok());
        assert!(matches!(
            request.check(DocumentId::new(2), DocumentId::new(1), 4),
            Err(FindError::StaleAsyncResult { .. })
        ));
        assert!(request
            .check(DocumentId::new(1), DocumentId::new(1), 5)
            .is_err());
    }
}
