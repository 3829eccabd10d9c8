//! Article authorization policy
//!
//! Pure decisions over `(actor, article, action)`. Nothing here touches the
//! store or fails: an absent actor, an absent rubrik or a mismatched status
//! simply denies.
//!
//! Each action owns a list of [`Grant`]s. A grant names who may act (the
//! *standing*), the statuses it applies in, and whether the article must be
//! filed under a rubrik. An action is allowed when any grant holds.
//!
//! | Action | Grants |
//! |---|---|
//! | view | super admin; author; rubrik editor in submitted/review_editor/revision/approved; rubrik admin in submitted/approved/review_admin |
//! | create | Author or Super Admin role |
//! | update | author in draft/revision; rubrik editor in review_editor/revision; rubrik admin in review_admin; super admin |
//! | delete | author in draft; super admin |
//! | submit | author in draft/revision, rubrik set |
//! | reviewAsEditor, approve, requestRevision | super admin; rubrik editor in submitted/review_editor/revision |
//! | reviewAsAdmin, publish, reject | super admin; rubrik admin in approved/review_admin |

use editorial_rbac::{ArticleAction, Role};

use crate::article::{Article, ArticleStatus};
use crate::error::{EditorialError, EditorialResult};
use crate::user::User;

use ArticleStatus::*;

/// Who a grant applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Standing {
    /// Holds the Super Admin role
    SuperAdmin,
    /// Wrote the article
    Author,
    /// Holds the role, regardless of rubrik
    Role(Role),
    /// Holds the role and is bound to the article's rubrik
    RubrikRole(Role),
}

impl Standing {
    /// Check if `actor` has this standing towards `article`.
    pub fn holds(&self, actor: &User, article: &Article) -> bool {
        match self {
            Standing::SuperAdmin => actor.is_super_admin(),
            Standing::Author => article.is_authored_by(actor.id),
            Standing::Role(role) => actor.has_role(*role),
            Standing::RubrikRole(role) => {
                actor.has_role(*role) && actor.rubrik_matches(article.rubrik_id)
            }
        }
    }
}

/// One way of being allowed to perform an action.
#[derive(Debug, Clone, Copy)]
pub struct Grant {
    /// Who
    pub standing: Standing,
    /// In which statuses (`None`: any)
    pub statuses: Option<&'static [ArticleStatus]>,
    /// Whether the article must be filed under a rubrik
    pub requires_rubrik: bool,
}

impl Grant {
    const fn always(standing: Standing) -> Self {
        Self {
            standing,
            statuses: None,
            requires_rubrik: false,
        }
    }

    const fn when(standing: Standing, statuses: &'static [ArticleStatus]) -> Self {
        Self {
            standing,
            statuses: Some(statuses),
            requires_rubrik: false,
        }
    }

    const fn with_rubrik(mut self) -> Self {
        self.requires_rubrik = true;
        self
    }

    /// Check the grant, status included.
    pub fn allows(&self, actor: &User, article: &Article) -> bool {
        self.standing.holds(actor, article)
            && self
                .statuses
                .map_or(true, |statuses| article.status.is_one_of(statuses))
            && (!self.requires_rubrik || article.rubrik_id.is_some())
    }
}

const EDITOR: Standing = Standing::RubrikRole(Role::EditorRubrik);
const ADMIN: Standing = Standing::RubrikRole(Role::AdminRubrik);

const VIEW: &[Grant] = &[
    Grant::always(Standing::SuperAdmin),
    Grant::always(Standing::Author),
    Grant::when(EDITOR, &[Submitted, ReviewEditor, Revision, Approved]),
    Grant::when(ADMIN, &[Submitted, Approved, ReviewAdmin]),
];

const CREATE: &[Grant] = &[
    Grant::always(Standing::Role(Role::Author)),
    Grant::always(Standing::SuperAdmin),
];

const UPDATE: &[Grant] = &[
    Grant::when(Standing::Author, &[Draft, Revision]),
    Grant::when(EDITOR, &[ReviewEditor, Revision]),
    Grant::when(ADMIN, &[ReviewAdmin]),
    Grant::always(Standing::SuperAdmin),
];

const DELETE: &[Grant] = &[
    Grant::when(Standing::Author, &[Draft]),
    Grant::always(Standing::SuperAdmin),
];

const SUBMIT: &[Grant] = &[Grant::when(Standing::Author, &[Draft, Revision]).with_rubrik()];

const EDITOR_STAGE: &[Grant] = &[
    Grant::always(Standing::SuperAdmin),
    Grant::when(EDITOR, &[Submitted, ReviewEditor, Revision]),
];

const ADMIN_STAGE: &[Grant] = &[
    Grant::always(Standing::SuperAdmin),
    Grant::when(ADMIN, &[Approved, ReviewAdmin]),
];

/// Grants for an action.
pub fn grants(action: ArticleAction) -> &'static [Grant] {
    match action {
        ArticleAction::View => VIEW,
        ArticleAction::Create => CREATE,
        ArticleAction::Update => UPDATE,
        ArticleAction::Delete => DELETE,
        ArticleAction::Submit => SUBMIT,
        ArticleAction::ReviewAsEditor | ArticleAction::Approve | ArticleAction::RequestRevision => {
            EDITOR_STAGE
        }
        ArticleAction::ReviewAsAdmin | ArticleAction::Publish | ArticleAction::Reject => {
            ADMIN_STAGE
        }
    }
}

/// Decide whether `actor` may perform `action` on `article`.
pub fn decide(actor: Option<&User>, article: &Article, action: ArticleAction) -> bool {
    match actor {
        Some(actor) => grants(action).iter().any(|g| g.allows(actor, article)),
        None => false,
    }
}

/// Check whether `actor` could perform `action` on `article` in *some*
/// status.
///
/// The same grants as [`decide`] with only the standing checked. A `false`
/// here means the action is off-limits for this actor whatever happens to
/// the article.
pub fn has_standing(actor: Option<&User>, article: &Article, action: ArticleAction) -> bool {
    match actor {
        Some(actor) => grants(action)
            .iter()
            .any(|g| g.standing.holds(actor, article)),
        None => false,
    }
}

/// [`decide`], as a `Result`.
pub fn authorize(
    actor: Option<&User>,
    article: &Article,
    action: ArticleAction,
) -> EditorialResult<()> {
    if decide(actor, article, action) {
        Ok(())
    } else {
        tracing::debug!(
            actor_id = ?actor.map(|a| a.id),
            article_id = %article.id,
            action = %action,
            status = %article.status,
            "Policy denied action"
        );
        Err(EditorialError::unauthorized(action))
    }
}

/// Every action `actor` may currently perform on `article`.
pub fn allowed_actions(actor: Option<&User>, article: &Article) -> Vec<ArticleAction> {
    ArticleAction::all()
        .into_iter()
        .filter(|action| decide(actor, article, *action))
        .collect()
}
