//! Contacts-framework-backed store (macOS)

use std::collections::HashSet;
use std::ptr;
use std::sync::Mutex;

use async_trait::async_trait;
use block2::RcBlock;
use objc2::rc::{Retained, autoreleasepool};
use objc2::runtime::{AnyObject, Bool};
use objc2::{class, msg_send, msg_send_id};
use pim_core::foundation::{
    nsarray_from, nsarray_items, nserror_message, nsstring_to_optional, nsstring_to_string,
    string_to_nsstring,
};
use tokio::sync::oneshot;
use tracing::{debug, error};

use crate::error::{ContactsError, Result};
use crate::models::{Birthday, Contact, NewContact};
use crate::store::ContactStore;

#[link(name = "Contacts", kind = "framework")]
unsafe extern "C" {}

/// `CNEntityTypeContacts`
const ENTITY_TYPE_CONTACTS: isize = 0;

// CNAuthorizationStatus
const STATUS_RESTRICTED: isize = 1;
const STATUS_DENIED: isize = 2;
const STATUS_AUTHORIZED: isize = 3;
const STATUS_LIMITED: isize = 4;

/// `NSDateComponentUndefined`
const COMPONENT_UNDEFINED: isize = isize::MAX;

/// Values of the `CNContact*Key` constants
const KEYS_TO_FETCH: [&str; 7] = [
    "identifier",
    "givenName",
    "familyName",
    "emailAddresses",
    "phoneNumbers",
    "organizationName",
    "birthday",
];

/// Values of `CNLabelHome` and `CNLabelPhoneNumberMobile`
const LABEL_HOME: &str = "_$!<Home>!$_";
const LABEL_MOBILE: &str = "_$!<Mobile>!$_";

/// The system address book
pub struct ContactsFrameworkStore {
    store: Retained<AnyObject>,
}

impl ContactsFrameworkStore {
    pub fn new() -> Result<Self> {
        let store: Option<Retained<AnyObject>> =
            unsafe { msg_send_id![class!(CNContactStore), new] };
        store
            .map(|store| Self { store })
            .ok_or_else(|| ContactsError::Store("Failed to open the contacts store".to_string()))
    }

    fn fetch(&self, predicate: *mut AnyObject) -> Result<Vec<Contact>> {
        let keys: Vec<*mut AnyObject> = KEYS_TO_FETCH.iter().map(|key| string_to_nsstring(key)).collect();
        let keys = nsarray_from(&keys);

        let mut error: *mut AnyObject = ptr::null_mut();
        let contacts: *mut AnyObject = unsafe {
            msg_send![
                &*self.store,
                unifiedContactsMatchingPredicate: predicate,
                keysToFetch: keys,
                error: &mut error
            ]
        };
        if contacts.is_null() {
            let message = nserror_message(error, "Failed to fetch contacts");
            error!("Contacts fetch failed: {}", message);
            return Err(ContactsError::Store(message));
        }

        Ok(nsarray_items(contacts).into_iter().map(contact_record).collect())
    }
}

#[async_trait(?Send)]
impl ContactStore for ContactsFrameworkStore {
    fn name(&self) -> &str {
        "contacts"
    }

    async fn request_access(&self) -> Result<()> {
        let status: isize = unsafe {
            msg_send![class!(CNContactStore), authorizationStatusForEntityType: ENTITY_TYPE_CONTACTS]
        };
        match status {
            STATUS_AUTHORIZED | STATUS_LIMITED => return Ok(()),
            STATUS_RESTRICTED | STATUS_DENIED => return Err(ContactsError::AccessDenied),
            _ => {}
        }

        debug!("Requesting contacts access (status {})", status);

        let (tx, rx) = oneshot::channel::<bool>();
        let tx = Mutex::new(Some(tx));
        let completion = RcBlock::new(move |granted: Bool, _error: *mut AnyObject| {
            if let Some(tx) = tx.lock().ok().and_then(|mut slot| slot.take()) {
                let _ = tx.send(granted.as_bool());
            }
        });

        let _: () = unsafe {
            msg_send![
                &*self.store,
                requestAccessForEntityType: ENTITY_TYPE_CONTACTS,
                completionHandler: &*completion
            ]
        };

        match rx.await {
            Ok(true) => Ok(()),
            _ => Err(ContactsError::AccessDenied),
        }
    }

    fn contacts_matching_name(&self, name: &str) -> Result<Vec<Contact>> {
        autoreleasepool(|_| {
            let predicate: *mut AnyObject = unsafe {
                msg_send![class!(CNContact), predicateForContactsMatchingName: string_to_nsstring(name)]
            };
            self.fetch(predicate)
        })
    }

    fn all_contacts(&self) -> Result<Vec<Contact>> {
        autoreleasepool(|_| {
            let mut error: *mut AnyObject = ptr::null_mut();
            let containers: *mut AnyObject = unsafe {
                msg_send![
                    &*self.store,
                    containersMatchingPredicate: ptr::null_mut::<AnyObject>(),
                    error: &mut error
                ]
            };
            if containers.is_null() {
                return Err(ContactsError::Store(nserror_message(
                    error,
                    "Failed to list contact containers",
                )));
            }

            // Unified contacts can span containers; keep each once.
            let mut seen = HashSet::new();
            let mut contacts = Vec::new();
            for container in nsarray_items(containers) {
                let identifier: *mut AnyObject = unsafe { msg_send![container, identifier] };
                let predicate: *mut AnyObject = unsafe {
                    msg_send![
                        class!(CNContact),
                        predicateForContactsInContainerWithIdentifier: identifier
                    ]
                };
                for contact in self.fetch(predicate)? {
                    let fresh = match &contact.identifier {
                        Some(id) => seen.insert(id.clone()),
                        None => true,
                    };
                    if fresh {
                        contacts.push(contact);
                    }
                }
            }
            Ok(contacts)
        })
    }

    fn create_contact(&self, contact: &NewContact) -> Result<Contact> {
        autoreleasepool(|_| {
            let native: Option<Retained<AnyObject>> =
                unsafe { msg_send_id![class!(CNMutableContact), new] };
            let native = native
                .ok_or_else(|| ContactsError::Store("Failed to create the contact".to_string()))?;

            unsafe {
                let _: () = msg_send![&*native, setGivenName: string_to_nsstring(&contact.given_name)];
                let _: () = msg_send![&*native, setFamilyName: string_to_nsstring(&contact.family_name)];
                if let Some(organization) = &contact.organization {
                    let _: () = msg_send![&*native, setOrganizationName: string_to_nsstring(organization)];
                }
                if let Some(email) = &contact.email {
                    let value = labeled_value(LABEL_HOME, string_to_nsstring(email));
                    let _: () = msg_send![&*native, setEmailAddresses: nsarray_from(&[value])];
                }
                if let Some(phone) = &contact.phone {
                    let number: *mut AnyObject = msg_send![
                        class!(CNPhoneNumber),
                        phoneNumberWithStringValue: string_to_nsstring(phone)
                    ];
                    let value = labeled_value(LABEL_MOBILE, number);
                    let _: () = msg_send![&*native, setPhoneNumbers: nsarray_from(&[value])];
                }
            }
            if let Some(birthday) = contact.birthday {
                let components = date_components(birthday)?;
                let _: () = unsafe { msg_send![&*native, setBirthday: &*components] };
            }

            let request: Option<Retained<AnyObject>> =
                unsafe { msg_send_id![class!(CNSaveRequest), new] };
            let request = request
                .ok_or_else(|| ContactsError::Store("Failed to create the save request".to_string()))?;
            let _: () = unsafe {
                msg_send![
                    &*request,
                    addContact: &*native,
                    toContainerWithIdentifier: ptr::null_mut::<AnyObject>()
                ]
            };

            let mut error: *mut AnyObject = ptr::null_mut();
            let saved: Bool =
                unsafe { msg_send![&*self.store, executeSaveRequest: &*request, error: &mut error] };
            if !saved.as_bool() {
                let message = nserror_message(error, "Failed to save the contact");
                error!("Contacts save failed: {}", message);
                return Err(ContactsError::Store(message));
            }

            Ok(contact_record(Retained::as_ptr(&native) as *mut AnyObject))
        })
    }
}

fn labeled_value(label: &str, value: *mut AnyObject) -> *mut AnyObject {
    unsafe {
        msg_send![
            class!(CNLabeledValue),
            labeledValueWithLabel: string_to_nsstring(label),
            value: value
        ]
    }
}

fn date_components(birthday: Birthday) -> Result<Retained<AnyObject>> {
    let components: Option<Retained<AnyObject>> =
        unsafe { msg_send_id![class!(NSDateComponents), new] };
    let components = components
        .ok_or_else(|| ContactsError::Store("Failed to create the birthday".to_string()))?;
    unsafe {
        let _: () = msg_send![&*components, setMonth: birthday.month as isize];
        let _: () = msg_send![&*components, setDay: birthday.day as isize];
        if let Some(year) = birthday.year {
            let _: () = msg_send![&*components, setYear: year as isize];
        }
    }
    Ok(components)
}

fn contact_record(contact: *mut AnyObject) -> Contact {
    let given_name = nsstring_to_string(unsafe { msg_send![contact, givenName] }).unwrap_or_default();
    let family_name = nsstring_to_string(unsafe { msg_send![contact, familyName] }).unwrap_or_default();

    let mut record = Contact::new(given_name, family_name);
    record.identifier = nsstring_to_optional(unsafe { msg_send![contact, identifier] });
    record.organization = nsstring_to_optional(unsafe { msg_send![contact, organizationName] });

    let emails: *mut AnyObject = unsafe { msg_send![contact, emailAddresses] };
    record.emails = nsarray_items(emails)
        .into_iter()
        .filter_map(|labeled| nsstring_to_optional(unsafe { msg_send![labeled, value] }))
        .collect();

    let phones: *mut AnyObject = unsafe { msg_send![contact, phoneNumbers] };
    record.phones = nsarray_items(phones)
        .into_iter()
        .filter_map(|labeled| {
            let number: *mut AnyObject = unsafe { msg_send![labeled, value] };
            if number.is_null() {
                return None;
            }
            nsstring_to_optional(unsafe { msg_send![number, stringValue] })
        })
        .collect();

    record.birthday = birthday_from(unsafe { msg_send![contact, birthday] });
    record
}

fn birthday_from(components: *mut AnyObject) -> Option<Birthday> {
    if components.is_null() {
        return None;
    }
    let month: isize = unsafe { msg_send![components, month] };
    let day: isize = unsafe { msg_send![components, day] };
    let year: isize = unsafe { msg_send![components, year] };

    if month == COMPONENT_UNDEFINED || day == COMPONENT_UNDEFINED {
        return None;
    }
    let year = (year != COMPONENT_UNDEFINED).then_some(year as i32);
    Some(Birthday::new(month as u32, day as u32, year))
}
