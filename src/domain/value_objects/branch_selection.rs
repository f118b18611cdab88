use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// ブランチ指定関連のエラー
#[derive(Debug, Error, PartialEq)]
pub enum BranchSelectionError {
    #[error("Branch selection cannot be empty")]
    Empty,

    #[error("Invalid character in branch name '{name}': {character}")]
    InvalidCharacter { name: String, character: String },

    #[error("Branch name cannot start with '-': {0}")]
    StartsWithHyphen(String),

    #[error("Branch name cannot end with '.lock': {0}")]
    EndsWithLock(String),

    #[error("Branch name contains consecutive dots: {0}")]
    ConsecutiveDots(String),

    #[error("Reserved branch name: {0}")]
    Reserved(String),
}

/// ローカルブランチをpushするためのrefspec（`refs/heads/<branch>`）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Refspec(String);

impl Refspec {
    /// ローカルブランチ名からrefspecを作成
    pub fn for_local_branch(branch: &str) -> Self {
        Self(format!("refs/heads/{}", branch))
    }

    /// refspecを文字列として取得
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Refspec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// pushするローカルブランチの指定
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchSelection {
    /// 全てのローカルブランチ
    All,
    /// 名前で指定したブランチ
    Named(Vec<String>),
}

/// ローカルブランチ一覧に対してBranchSelectionを適用した結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedBranches {
    /// pushするrefspec（ローカルブランチの列挙順）
    pub refspecs: Vec<Refspec>,
    /// 指定されたがローカルに存在しないブランチ
    pub missing: Vec<String>,
}

impl BranchSelection {
    /// ローカルブランチの列挙順を保ったままrefspecの一覧を計算する
    ///
    /// 1リポジトリにつき1回だけ計算し、1回のpushでまとめて送信する。
    pub fn resolve(&self, local_branches: &[String]) -> ResolvedBranches {
        match self {
            BranchSelection::All => ResolvedBranches {
                refspecs: local_branches
                    .iter()
                    .map(|b| Refspec::for_local_branch(b))
                    .collect(),
                missing: Vec::new(),
            },
            BranchSelection::Named(names) => {
                let refspecs = local_branches
                    .iter()
                    .filter(|b| names.contains(b))
                    .map(|b| Refspec::for_local_branch(b))
                    .collect();
                let missing = names
                    .iter()
                    .filter(|n| !local_branches.contains(n))
                    .cloned()
                    .collect();
                ResolvedBranches { refspecs, missing }
            }
        }
    }

    /// ブランチ名の妥当性を検証
    fn validate_name(name: &str) -> Result<(), BranchSelectionError> {
        if name.starts_with('-') {
            return Err(BranchSelectionError::StartsWithHyphen(name.to_string()));
        }

        if name.ends_with(".lock") {
            return Err(BranchSelectionError::EndsWithLock(name.to_string()));
        }

        if matches!(name, "HEAD" | "ORIG_HEAD" | "FETCH_HEAD" | "MERGE_HEAD") {
            return Err(BranchSelectionError::Reserved(name.to_string()));
        }

        // ASCII制御文字、スペース、~、^、:、?、*、[、\、DEL
        if let Some(ch) = name.chars().find(|ch| {
            ch.is_ascii_control() || matches!(ch, ' ' | '~' | '^' | ':' | '?' | '*' | '[' | '\\')
        }) {
            return Err(BranchSelectionError::InvalidCharacter {
                name: name.to_string(),
                character: ch.to_string(),
            });
        }

        if name.contains("..") {
            return Err(BranchSelectionError::ConsecutiveDots(name.to_string()));
        }

        Ok(())
    }
}

impl FromStr for BranchSelection {
    type Err = BranchSelectionError;

    /// `all` または `name,name,...` を解析する
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(BranchSelectionError::Empty);
        }
        if trimmed == "all" {
            return Ok(BranchSelection::All);
        }

        let mut names: Vec<String> = Vec::new();
        for name in trimmed.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            Self::validate_name(name)?;
            if !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }

        if names.is_empty() {
            return Err(BranchSelectionError::Empty);
        }
        Ok(BranchSelection::Named(names))
    }
}

impl fmt::Display for BranchSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchSelection::All => f.write_str("all"),
            BranchSelection::Named(names) => f.write_str(&names.join(",")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn branches(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_all_branches_follow_enumeration_order() {
        let local = branches(&["main", "feature-x"]);
        let resolved = BranchSelection::All.resolve(&local);

        let refspecs: Vec<&str> = resolved.refspecs.iter().map(|r| r.as_str()).collect();
        assert_eq!(refspecs, vec!["refs/heads/main", "refs/heads/feature-x"]);
        assert!(resolved.missing.is_empty());
    }

    #[test]
    fn test_named_branches_use_local_order_and_report_missing() {
        let local = branches(&["develop", "main", "feature-x"]);
        let selection: BranchSelection = "feature-x,main,gone".parse().unwrap();
        let resolved = selection.resolve(&local);

        let refspecs: Vec<&str> = resolved.refspecs.iter().map(|r| r.as_str()).collect();
        assert_eq!(refspecs, vec!["refs/heads/main", "refs/heads/feature-x"]);
        assert_eq!(resolved.missing, vec!["gone".to_string()]);
    }

    #[test]
    fn test_parse_all() {
        assert_eq!("all".parse::<BranchSelection>().unwrap(), BranchSelection::All);
        assert_eq!(" all ".parse::<BranchSelection>().unwrap(), BranchSelection::All);
    }

    #[test]
    fn test_parse_named_deduplicates() {
        let selection: BranchSelection = "main, main ,feature/login".parse().unwrap();
        assert_eq!(
            selection,
            BranchSelection::Named(branches(&["main", "feature/login"]))
        );
        assert_eq!(selection.to_string(), "main,feature/login");
    }

    #[test]
    fn test_parse_rejects_invalid_names() {
        assert_eq!("".parse::<BranchSelection>(), Err(BranchSelectionError::Empty));
        assert_eq!(",,".parse::<BranchSelection>(), Err(BranchSelectionError::Empty));
        assert!(matches!(
            "-bad".parse::<BranchSelection>(),
            Err(BranchSelectionError::StartsWithHyphen(_))
        ));
        assert!(matches!(
            "HEAD".parse::<BranchSelection>(),
            Err(BranchSelectionError::Reserved(_))
        ));
        assert!(matches!(
            "a..b".parse::<BranchSelection>(),
            Err(BranchSelectionError::ConsecutiveDots(_))
        ));
        assert!(matches!(
            "with space".parse::<BranchSelection>(),
            Err(BranchSelectionError::InvalidCharacter { .. })
        ));
        assert!(matches!(
            "topic.lock".parse::<BranchSelection>(),
            Err(BranchSelectionError::EndsWithLock(_))
        ));
    }
}
