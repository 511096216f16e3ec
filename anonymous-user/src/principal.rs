//! A minimal claims-based principal carried in the request extensions.

/// A typed attribute of a principal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Claim {
    pub claim_type: String,
    pub value: String,
}

impl Claim {
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }
}

/// An identity holding a claim set that can be extended.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClaimsIdentity {
    authentication_type: Option<String>,
    claims: Vec<Claim>,
}

impl ClaimsIdentity {
    /// Unauthenticated identity carrying `claims`.
    pub fn new(claims: Vec<Claim>) -> Self {
        Self {
            authentication_type: None,
            claims,
        }
    }

    pub fn authenticated(authentication_type: impl Into<String>, claims: Vec<Claim>) -> Self {
        Self {
            authentication_type: Some(authentication_type.into()),
            claims,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authentication_type
            .as_deref()
            .is_some_and(|t| !t.is_empty())
    }

    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    pub fn add_claim(&mut self, claim: Claim) {
        self.claims.push(claim);
    }
}

/// An identity established by an upstream authenticator that cannot hold claims.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpaqueIdentity {
    pub name: String,
    pub authentication_type: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Identity {
    Claims(ClaimsIdentity),
    Opaque(OpaqueIdentity),
}

impl Identity {
    pub fn is_authenticated(&self) -> bool {
        match self {
            Identity::Claims(identity) => identity.is_authenticated(),
            Identity::Opaque(identity) => identity
                .authentication_type
                .as_deref()
                .is_some_and(|t| !t.is_empty()),
        }
    }

    pub fn claims(&self) -> &[Claim] {
        match self {
            Identity::Claims(identity) => identity.claims(),
            Identity::Opaque(_) => &[],
        }
    }

    /// Returns the claim holder when this identity accepts additional claims.
    pub fn as_claims_mut(&mut self) -> Option<&mut ClaimsIdentity> {
        match self {
            Identity::Claims(identity) => Some(identity),
            Identity::Opaque(_) => None,
        }
    }
}

/// The user behind a request. The first identity is the primary one.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Principal {
    identities: Vec<Identity>,
}

impl Principal {
    pub fn new(identity: Identity) -> Self {
        Self {
            identities: vec![identity],
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identities.first()
    }

    pub fn identities(&self) -> &[Identity] {
        &self.identities
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity().is_some_and(Identity::is_authenticated)
    }

    pub fn add_identity(&mut self, identity: Identity) {
        self.identities.push(identity);
    }

    pub fn claims(&self) -> impl Iterator<Item = &Claim> {
        self.identities.iter().flat_map(|identity| identity.claims())
    }

    pub fn find_first(&self, claim_type: &str) -> Option<&Claim> {
        self.claims().find(|claim| claim.claim_type == claim_type)
    }

    pub fn has_claim(&self, claim_type: &str) -> bool {
        self.find_first(claim_type).is_some()
    }

    /// Adds `claim` to the primary identity if it holds claims, otherwise
    /// attaches a new identity carrying only this claim.
    pub fn merge_claim(&mut self, claim: Claim) {
        match self
            .identities
            .first_mut()
            .and_then(Identity::as_claims_mut)
        {
            Some(holder) => holder.add_claim(claim),
            None => self.add_identity(Identity::Claims(ClaimsIdentity::new(vec![claim]))),
        }
    }
}
