//! The end-to-end scenarios exercised against a PetFriends deployment.
//!
//! Each scenario logs in on its own and creates whatever pets it needs, so
//! any subset can run in any order against the same account.

use petfriends_core::{AuthKey, Credentials, Pet, PetFields, PetFilter, PetList};

use crate::scenario::{decode, Scenario, ScenarioContext, ScenarioError};
use crate::{check, check_eq};

/// Scenarios whose name contains any of `filters`; every scenario when
/// `filters` is empty.
pub fn select(filters: &[String]) -> Vec<Scenario> {
    all()
        .into_iter()
        .filter(|s| filters.is_empty() || filters.iter().any(|f| s.name.contains(f.as_str())))
        .collect()
}

pub fn all() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "api_key_for_valid_user",
            description: "valid credentials yield 200 and a key",
            run: api_key_for_valid_user,
        },
        Scenario {
            name: "api_key_rejected_for_invalid_password",
            description: "a wrong password yields no key",
            run: api_key_rejected_for_invalid_password,
        },
        Scenario {
            name: "api_key_rejected_for_empty_password",
            description: "an empty password yields no key",
            run: api_key_rejected_for_empty_password,
        },
        Scenario {
            name: "api_key_rejected_for_invalid_email",
            description: "an unknown email yields no key",
            run: api_key_rejected_for_invalid_email,
        },
        Scenario {
            name: "api_key_rejected_for_empty_email",
            description: "an empty email yields no key",
            run: api_key_rejected_for_empty_email,
        },
        Scenario {
            name: "all_pets_with_valid_key",
            description: "the unfiltered listing is non-empty",
            run: all_pets_with_valid_key,
        },
        Scenario {
            name: "my_pets_lists_only_own_pets",
            description: "the my_pets filter only returns the account's pets",
            run: my_pets_lists_only_own_pets,
        },
        Scenario {
            name: "list_pets_rejected_for_invalid_key",
            description: "a forged key cannot list pets",
            run: list_pets_rejected_for_invalid_key,
        },
        Scenario {
            name: "add_pet_without_photo",
            description: "a pet created without photo echoes its name",
            run: add_pet_without_photo,
        },
        Scenario {
            name: "add_pet_with_photo",
            description: "a pet created with photo echoes its name and has a photo",
            run: add_pet_with_photo,
        },
        Scenario {
            name: "add_pet_with_empty_fields",
            description: "a pet with empty fields is accepted",
            run: add_pet_with_empty_fields,
        },
        Scenario {
            name: "set_pet_photo",
            description: "an attached photo shows up in the listing",
            run: set_pet_photo,
        },
        Scenario {
            name: "update_pet_information",
            description: "updated fields are echoed back",
            run: update_pet_information,
        },
        Scenario {
            name: "delete_pet",
            description: "a deleted pet disappears from the listing",
            run: delete_pet,
        },
    ]
}

fn snail() -> PetFields {
    PetFields::new("Bataty", "Snail", "7")
}

fn api_key_for_valid_user(ctx: &ScenarioContext<'_>) -> Result<(), ScenarioError> {
    let response = ctx.api.get_api_key(&ctx.settings.credentials)?;
    check_eq!(response.status, 200);
    check!(response.has_field("key"), "no key in body: {:?}", response.body);
    Ok(())
}

/// Logging in with `credentials` must fail: no 2xx status and no key.
fn expect_no_key(ctx: &ScenarioContext<'_>, credentials: Credentials) -> Result<(), ScenarioError> {
    let response = ctx.api.get_api_key(&credentials)?;
    check!(
        !response.is_success(),
        "login as {:?} succeeded with {}",
        credentials.email,
        response.status
    );
    check!(
        !response.has_field("key"),
        "login as {:?} returned a key",
        credentials.email
    );
    Ok(())
}

fn api_key_rejected_for_invalid_password(ctx: &ScenarioContext<'_>) -> Result<(), ScenarioError> {
    let password = ctx
        .settings
        .invalid_password
        .clone()
        .ok_or_else(|| ScenarioError::Skipped("no invalid password configured".to_string()))?;
    expect_no_key(ctx, Credentials::new(ctx.settings.credentials.email.as_str(), password))
}

fn api_key_rejected_for_empty_password(ctx: &ScenarioContext<'_>) -> Result<(), ScenarioError> {
    expect_no_key(ctx, Credentials::new(ctx.settings.credentials.email.as_str(), ""))
}

fn api_key_rejected_for_invalid_email(ctx: &ScenarioContext<'_>) -> Result<(), ScenarioError> {
    let email = ctx
        .settings
        .invalid_email
        .clone()
        .ok_or_else(|| ScenarioError::Skipped("no invalid email configured".to_string()))?;
    expect_no_key(ctx, Credentials::new(email, ctx.settings.credentials.password.as_str()))
}

fn api_key_rejected_for_empty_email(ctx: &ScenarioContext<'_>) -> Result<(), ScenarioError> {
    expect_no_key(ctx, Credentials::new("", ctx.settings.credentials.password.as_str()))
}

fn all_pets_with_valid_key(ctx: &ScenarioContext<'_>) -> Result<(), ScenarioError> {
    let key = ctx.login()?;
    ctx.provision_pet(&key, &snail())?;

    let response = ctx.api.list_pets(&key, PetFilter::All)?;
    check_eq!(response.status, 200);
    let list: PetList = decode(&response)?;
    check!(!list.pets.is_empty(), "listing is empty after creating a pet");
    Ok(())
}

fn my_pets_lists_only_own_pets(ctx: &ScenarioContext<'_>) -> Result<(), ScenarioError> {
    let key = ctx.login()?;
    let pet = ctx.provision_pet(&key, &snail())?;
    let owner = pet
        .user_id
        .clone()
        .ok_or_else(|| ScenarioError::Check("created pet carries no user_id".to_string()))?;

    let mine = ctx.my_pets(&key)?;
    check!(mine.contains(&pet.id), "pet {} missing from my_pets", pet.id);
    for listed in &mine.pets {
        check!(
            listed.user_id.as_deref() == Some(owner.as_str()),
            "pet {} belongs to {:?}, not {owner}",
            listed.id,
            listed.user_id
        );
    }
    Ok(())
}

fn list_pets_rejected_for_invalid_key(ctx: &ScenarioContext<'_>) -> Result<(), ScenarioError> {
    let key = ctx.login()?;
    let forged = AuthKey::new(format!("{}-forged", key.as_str()));
    let response = ctx.api.list_pets(&forged, PetFilter::All)?;
    check!(
        !response.is_success(),
        "forged key listed pets with {}",
        response.status
    );
    check!(!response.has_field("pets"), "forged key received pets");
    Ok(())
}

fn add_pet_without_photo(ctx: &ScenarioContext<'_>) -> Result<(), ScenarioError> {
    let key = ctx.login()?;
    let fields = snail();
    let response = ctx.api.create_pet_simple(&key, &fields)?;
    check_eq!(response.status, 200);
    let pet: Pet = decode(&response)?;
    check_eq!(pet.name, fields.name);
    Ok(())
}

fn add_pet_with_photo(ctx: &ScenarioContext<'_>) -> Result<(), ScenarioError> {
    let key = ctx.login()?;
    let fields = snail();
    let response = ctx.api.create_pet(&key, &fields, &ctx.settings.photo)?;
    check_eq!(response.status, 200);
    let pet: Pet = decode(&response)?;
    check_eq!(pet.name, fields.name);
    check!(pet.pet_photo.is_some(), "pet {} has no photo", pet.id);
    Ok(())
}

/// The service accepts a pet whose fields are all empty.
fn add_pet_with_empty_fields(ctx: &ScenarioContext<'_>) -> Result<(), ScenarioError> {
    let key = ctx.login()?;
    let fields = PetFields::new("", "", "");
    let response = ctx.api.create_pet_simple(&key, &fields)?;
    check_eq!(response.status, 200);
    let pet: Pet = decode(&response)?;
    check_eq!(pet.name, "");
    Ok(())
}

fn set_pet_photo(ctx: &ScenarioContext<'_>) -> Result<(), ScenarioError> {
    let key = ctx.login()?;
    let pet = ctx.provision_pet(&key, &snail())?;

    let response = ctx.api.set_photo(&key, &pet.id, &ctx.settings.photo)?;
    check_eq!(response.status, 200);
    let updated: Pet = decode(&response)?;
    check!(updated.pet_photo.is_some(), "set_photo returned no photo");

    let mine = ctx.my_pets(&key)?;
    let listed = mine
        .find(&pet.id)
        .ok_or_else(|| ScenarioError::Check(format!("pet {} missing from my_pets", pet.id)))?;
    check_eq!(listed.pet_photo, updated.pet_photo);
    Ok(())
}

fn update_pet_information(ctx: &ScenarioContext<'_>) -> Result<(), ScenarioError> {
    let key = ctx.login()?;
    let pet = ctx.provision_pet(&key, &snail())?;

    let fields = PetFields::new("Tatuya", "Snail", "10");
    let response = ctx.api.update_pet(&key, &pet.id, &fields)?;
    check_eq!(response.status, 200);
    let updated: Pet = decode(&response)?;
    check_eq!(updated.id, pet.id);
    check_eq!(updated.name, fields.name);
    check_eq!(updated.animal_type, fields.animal_type);
    check_eq!(updated.age, fields.age);
    Ok(())
}

fn delete_pet(ctx: &ScenarioContext<'_>) -> Result<(), ScenarioError> {
    let key = ctx.login()?;
    let pet = ctx.provision_pet(&key, &snail())?;

    let response = ctx.api.delete_pet(&key, &pet.id)?;
    check_eq!(response.status, 200);

    let mine = ctx.my_pets(&key)?;
    check!(!mine.contains(&pet.id), "pet {} still listed after delete", pet.id);
    Ok(())
}
