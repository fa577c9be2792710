//! Sprite images
//!
//! Images are loaded through `HtmlImageElement` and reported to the
//! [`AssetGate`](crate::assets::AssetGate) via callbacks. The projectile
//! sprite can be swapped at runtime (drag and drop) without touching physics.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::HtmlImageElement;

use crate::assets::AssetId;
use crate::error::{CannonError, Result};

/// The three images the renderer draws
#[derive(Debug, Clone)]
pub struct Sprites {
    pub base: HtmlImageElement,
    pub body: HtmlImageElement,
    pub projectile: HtmlImageElement,
}

impl Sprites {
    /// Create image elements and start loading them.
    ///
    /// `on_done` is called once per image with `Ok` on load or `Err` with the
    /// reason on error. The closures live as long as the images.
    pub fn load(on_done: Rc<dyn Fn(AssetId, std::result::Result<(), String>)>) -> Result<Self> {
        let base = load_image(AssetId::CannonBase, on_done.clone())?;
        let body = load_image(AssetId::CannonBody, on_done.clone())?;
        let projectile = load_image(AssetId::Projectile, on_done)?;
        Ok(Self {
            base,
            body,
            projectile,
        })
    }
}

fn load_image(
    asset: AssetId,
    on_done: Rc<dyn Fn(AssetId, std::result::Result<(), String>)>,
) -> Result<HtmlImageElement> {
    let image = HtmlImageElement::new()
        .map_err(|e| CannonError::MissingElement(format!("img for {}: {:?}", asset.name(), e)))?;

    {
        let on_done = on_done.clone();
        let closure = Closure::<dyn FnMut()>::new(move || on_done(asset, Ok(())));
        image.set_onload(Some(closure.as_ref().unchecked_ref()));
        closure.forget();
    }
    {
        let closure = Closure::<dyn FnMut()>::new(move || {
            on_done(asset, Err(format!("could not load {}", asset.url())))
        });
        image.set_onerror(Some(closure.as_ref().unchecked_ref()));
        closure.forget();
    }

    image.set_src(asset.url());
    Ok(image)
}

/// Replace the projectile sprite with an image decoded from `url`
/// (typically an object URL for a dropped file). The swap happens once the
/// new image has loaded; until then the old sprite keeps drawing.
pub fn replace_sprite(sprites: Rc<RefCell<Option<Sprites>>>, url: String) -> Result<()> {
    let image = HtmlImageElement::new()
        .map_err(|e| CannonError::MissingElement(format!("img for drop: {:?}", e)))?;

    {
        let image_ref = image.clone();
        let url = url.clone();
        let closure = Closure::<dyn FnMut()>::new(move || {
            if let Some(sprites) = sprites.borrow_mut().as_mut() {
                sprites.projectile = image_ref.clone();
                log::info!("Projectile sprite replaced");
            }
            let _ = web_sys::Url::revoke_object_url(&url);
        });
        image.set_onload(Some(closure.as_ref().unchecked_ref()));
        closure.forget();
    }
    {
        let closure = Closure::<dyn FnMut()>::new(move || {
            log::warn!("Dropped file is not a usable image");
        });
        image.set_onerror(Some(closure.as_ref().unchecked_ref()));
        closure.forget();
    }

    image.set_src(&url);
    Ok(())
}
