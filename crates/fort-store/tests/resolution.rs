//! End-to-end resolution and authorization against the in-memory store.

use fort_rbac::{Gate, GateConfig, HasAbilities, NewAbility, Role, RoleOperation, User};
use fort_store::{AccessLoader, Authorizer, MemoryStore, StoreError, Targets};
use std::sync::Arc;

struct Fixture {
    store: MemoryStore,
    admin: User,
    member: User,
    editor: Role,
}

/// `admin` holds every `<op>.role` ability, the `editor` slug ability and the
/// `editor` role. `member` has nothing.
async fn fixture() -> Fixture {
    let store = MemoryStore::new();
    let admin = store.create_user(User::new("admin")).await.unwrap();
    let member = store.create_user(User::new("member")).await.unwrap();
    let editor = store.create_role(Role::new("editor", "Editor")).await.unwrap();

    for op in RoleOperation::all() {
        let ability = store
            .define_ability(NewAbility::new(op.as_str(), "role", format!("{} roles", op)))
            .await
            .unwrap();
        store.grant_ability_to_user(admin.id, ability.id).await.unwrap();
    }
    let holds_editor = store
        .define_ability(NewAbility::new("hold", "editor", "Editor role").with_slug("editor"))
        .await
        .unwrap();
    store.grant_ability_to_user(admin.id, holds_editor.id).await.unwrap();
    store.assign_role(admin.id, editor.id).await.unwrap();

    Fixture {
        store,
        admin,
        member,
        editor,
    }
}

#[tokio::test]
async fn resolve_user_unions_direct_and_role_abilities() {
    let store = MemoryStore::new();
    let user = store.create_user(User::new("alice")).await.unwrap();
    let role = store.create_role(Role::new("auditor", "Auditor")).await.unwrap();
    let view = store
        .define_ability(NewAbility::new("view", "role", "View roles"))
        .await
        .unwrap();
    let export = store
        .define_ability(NewAbility::new("export", "role", "Export roles"))
        .await
        .unwrap();

    store.grant_ability_to_user(user.id, view.id).await.unwrap();
    store.grant_ability_to_role(role.id, view.id).await.unwrap();
    store.grant_ability_to_role(role.id, export.id).await.unwrap();
    store.assign_role(user.id, role.id).await.unwrap();

    let resolved = store.resolve_user(user.id).await.unwrap();
    let slugs: Vec<String> = resolved.effective_abilities().iter().map(String::from).collect();
    assert_eq!(slugs, vec!["export.role", "view.role"]);
    assert!(resolved.has_role("auditor"));
    assert_eq!(resolved.roles[0].users, vec![user.id]);
}

#[tokio::test]
async fn soft_deleted_abilities_are_not_loaded() {
    let store = MemoryStore::new();
    let user = store.create_user(User::new("alice")).await.unwrap();
    let role = store.create_role(Role::new("auditor", "Auditor")).await.unwrap();
    let view = store
        .define_ability(NewAbility::new("view", "role", "View roles"))
        .await
        .unwrap();
    store.grant_ability_to_user(user.id, view.id).await.unwrap();
    store.grant_ability_to_role(role.id, view.id).await.unwrap();

    store.soft_delete_ability(view.id).await.unwrap();
    assert!(store.load_abilities_for(user.id).await.unwrap().is_empty());
    assert!(store.load_role_abilities(role.id).await.unwrap().is_empty());
    assert!(store.find_ability("view.role").await.is_none());
    assert_eq!(store.trashed_abilities().await.len(), 1);

    // The record and its assignments survive a restore
    store.restore_ability(view.id).await.unwrap();
    assert_eq!(store.load_abilities_for(user.id).await.unwrap().len(), 1);
    assert!(store.ability(view.id).await.unwrap().is_active());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn resolved_users_reflect_a_single_committed_state() {
    let store = MemoryStore::new();
    let user = store.create_user(User::new("alice")).await.unwrap();
    let role = store.create_role(Role::new("auditor", "Auditor")).await.unwrap();
    let view = store
        .define_ability(NewAbility::new("view", "role", "View roles"))
        .await
        .unwrap();
    store.grant_ability_to_user(user.id, view.id).await.unwrap();

    // The writer swaps the direct ability for the role and back, always
    // revoking one before granting the other
    let writer = {
        let store = store.clone();
        tokio::spawn(async move {
            for _ in 0..200 {
                store.revoke_ability_from_user(user.id, view.id).await.unwrap();
                store.assign_role(user.id, role.id).await.unwrap();
                store.unassign_role(user.id, role.id).await.unwrap();
                store.grant_ability_to_user(user.id, view.id).await.unwrap();
            }
        })
    };

    let mut readers = Vec::new();
    for _ in 0..4 {
        let store = store.clone();
        readers.push(tokio::spawn(async move {
            for _ in 0..200 {
                let snapshot = store.resolve_user(user.id).await.unwrap();
                assert!(
                    snapshot.abilities.is_empty() || snapshot.roles.is_empty(),
                    "direct ability and role never coexist"
                );
            }
        }));
    }

    writer.await.unwrap();
    for reader in readers {
        reader.await.unwrap();
    }
}

#[tokio::test]
async fn resolve_role_counts_abilities_and_users() {
    let f = fixture().await;
    let role = f.store.resolve_role(f.editor.id).await.unwrap();
    assert!(role.abilities.is_empty());
    assert_eq!(role.users, vec![f.admin.id]);
}

#[tokio::test]
async fn admin_may_manage_editor_role() {
    let f = fixture().await;
    let authorizer = Authorizer::new(f.store, Gate::default());

    for op in [RoleOperation::View, RoleOperation::Update] {
        authorizer
            .authorize(op, f.admin.id, Targets::role(f.editor.id))
            .await
            .unwrap();
    }
    for op in [RoleOperation::Create, RoleOperation::Import, RoleOperation::Export] {
        assert!(authorizer
            .allows(op, f.admin.id, Targets::collection())
            .await
            .unwrap());
    }
    for op in [RoleOperation::Give, RoleOperation::Remove] {
        assert!(authorizer
            .allows(op, f.admin.id, Targets::assignment(f.editor.id, f.member.id))
            .await
            .unwrap());
    }

    // Delete is refused while the admin still holds the role
    assert!(!authorizer
        .allows(RoleOperation::Delete, f.admin.id, Targets::role(f.editor.id))
        .await
        .unwrap());
}

#[tokio::test]
async fn unused_role_can_be_deleted() {
    let f = fixture().await;
    f.store.unassign_role(f.admin.id, f.editor.id).await.unwrap();
    let authorizer = Authorizer::new(f.store.clone(), Gate::default());

    assert!(authorizer
        .allows(RoleOperation::Delete, f.admin.id, Targets::role(f.editor.id))
        .await
        .unwrap());

    // Attaching an ability makes it undeletable again
    let view = f.store.find_ability("view.role").await.unwrap();
    f.store.grant_ability_to_role(f.editor.id, view.id).await.unwrap();
    assert!(!authorizer
        .allows(RoleOperation::Delete, f.admin.id, Targets::role(f.editor.id))
        .await
        .unwrap());
}

#[tokio::test]
async fn member_is_denied_everything() {
    let f = fixture().await;
    let authorizer = Authorizer::new(f.store, Gate::default());

    let err = authorizer
        .authorize(RoleOperation::View, f.member.id, Targets::role(f.editor.id))
        .await
        .unwrap_err();
    assert!(err.is_forbidden());
    assert!(!authorizer
        .allows(RoleOperation::Create, f.member.id, Targets::collection())
        .await
        .unwrap());
}

#[tokio::test]
async fn protected_target_user_cannot_be_given_roles() {
    let f = fixture().await;
    let root = f
        .store
        .create_user(User::new("root").protected())
        .await
        .unwrap();
    let authorizer = Authorizer::new(f.store, Gate::default());

    assert!(!authorizer
        .allows(RoleOperation::Give, f.admin.id, Targets::assignment(f.editor.id, root.id))
        .await
        .unwrap());
}

#[tokio::test]
async fn unknown_ids_and_bad_targets_are_errors() {
    let f = fixture().await;
    let authorizer = Authorizer::new(f.store, Gate::default());

    let err = authorizer
        .allows(RoleOperation::View, f.admin.id, Targets::role(uuid::Uuid::now_v7()))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::RoleNotFound(_)));

    let err = authorizer
        .allows(RoleOperation::Give, f.admin.id, Targets::role(f.editor.id))
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_ARGUMENT");
}

#[tokio::test]
async fn superadmin_role_holder_bypasses() {
    let f = fixture().await;
    let root_role = f
        .store
        .create_role(Role::new("root", "Root").superadmin())
        .await
        .unwrap();
    f.store.assign_role(f.member.id, root_role.id).await.unwrap();

    // The bypass skips the delete preconditions too: editor is still held
    let editor = f.store.resolve_role(f.editor.id).await.unwrap();
    assert!(!editor.is_unused());
    let authorizer = Authorizer::new(f.store.clone(), Gate::default());
    assert!(authorizer
        .allows(RoleOperation::Delete, f.member.id, Targets::role(f.editor.id))
        .await
        .unwrap());

    let strict = Authorizer::new(f.store, Gate::new(GateConfig::default().without_bypass()));
    assert!(!strict
        .allows(RoleOperation::Delete, f.member.id, Targets::role(f.editor.id))
        .await
        .unwrap());
}

#[tokio::test]
async fn concurrent_decisions_agree() {
    let f = fixture().await;
    let authorizer = Arc::new(Authorizer::new(f.store, Gate::default()));

    let mut handles = Vec::new();
    for i in 0..32 {
        let authorizer = Arc::clone(&authorizer);
        let actor = if i % 2 == 0 { f.admin.id } else { f.member.id };
        let role = f.editor.id;
        handles.push(tokio::spawn(async move {
            authorizer
                .allows(RoleOperation::Update, actor, Targets::role(role))
                .await
                .unwrap()
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.await.unwrap(), i % 2 == 0);
    }
}
