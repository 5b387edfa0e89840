use crate::error::CoreError;

/// Buffer de pixels RGBA8, row-major, 4 bytes par pixel.
///
/// # Example
/// ```
/// use eh_core::frame::FrameBuffer;
/// let fb = FrameBuffer::new(10, 10);
/// assert_eq!(fb.data.len(), 400);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    /// Pixels RGBA, row-major, 4 bytes par pixel.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl FrameBuffer {
    /// Crée un buffer noir transparent aux dimensions données.
    ///
    /// # Example
    /// ```
    /// use eh_core::frame::FrameBuffer;
    /// let fb = FrameBuffer::new(100, 50);
    /// assert_eq!(fb.width, 100);
    /// assert_eq!(fb.data.len(), 100 * 50 * 4);
    /// ```
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            data: vec![0u8; width as usize * height as usize * 4],
            width,
            height,
        }
    }

    /// Enveloppe un buffer RGBA existant.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidDimensions`] if `data.len() != width * height * 4`.
    ///
    /// # Example
    /// ```
    /// use eh_core::frame::FrameBuffer;
    /// assert!(FrameBuffer::from_raw(2, 1, vec![0; 8]).is_ok());
    /// assert!(FrameBuffer::from_raw(2, 1, vec![0; 7]).is_err());
    /// ```
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self, CoreError> {
        if data.len() != width as usize * height as usize * 4 {
            return Err(CoreError::InvalidDimensions {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Buffer dont chaque pixel vaut `(v, v, v, 255)`, une valeur par pixel, row-major.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidDimensions`] if `values.len() != width * height`.
    pub fn from_gray(width: u32, height: u32, values: &[u8]) -> Result<Self, CoreError> {
        let data = values.iter().flat_map(|&v| [v, v, v, 255]).collect();
        Self::from_raw(width, height, data).map_err(|_| CoreError::InvalidDimensions {
            width,
            height,
            len: values.len(),
        })
    }

    #[inline(always)]
    fn offset(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height, "pixel out of bounds");
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Accès au pixel (x, y) → (r, g, b, a).
    ///
    /// # Example
    /// ```
    /// use eh_core::frame::FrameBuffer;
    /// let fb = FrameBuffer::new(10, 10);
    /// assert_eq!(fb.pixel(0, 0), (0, 0, 0, 0));
    /// ```
    #[inline(always)]
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> (u8, u8, u8, u8) {
        let idx = self.offset(x, y);
        (
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        )
    }

    /// Valeur d'un canal au pixel (x, y).
    #[inline(always)]
    #[must_use]
    pub fn channel(&self, x: u32, y: u32, channel: Channel) -> u8 {
        self.data[self.offset(x, y) + channel.index()]
    }

    /// Écrit un canal au pixel (x, y).
    #[inline(always)]
    pub fn set_channel(&mut self, x: u32, y: u32, channel: Channel, value: u8) {
        let idx = self.offset(x, y) + channel.index();
        self.data[idx] = value;
    }
}

/// Canal couleur traité par le moteur. L'alpha n'est jamais remappé.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    /// Rouge, aussi le canal source du mode niveaux de gris.
    Red,
    /// Vert.
    Green,
    /// Bleu.
    Blue,
}

impl Channel {
    /// Ordre de traitement en mode couleur. Il partage un seul flux aléatoire,
    /// le changer change la sortie.
    pub const RGB: [Self; 3] = [Self::Red, Self::Green, Self::Blue];

    /// Position de l'octet dans un pixel RGBA.
    #[inline(always)]
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Red => 0,
            Self::Green => 1,
            Self::Blue => 2,
        }
    }
}

/// Sélection rectangulaire à égaliser.
///
/// # Example
/// ```
/// use eh_core::frame::{FrameBuffer, Region};
/// let fb = FrameBuffer::new(8, 4);
/// let full = Region::full(&fb);
/// assert_eq!(full.pixel_count(), 32);
/// assert!(Region::new(6, 0, 4, 4).validate(&fb).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Region {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Region {
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Toute l'image.
    #[must_use]
    pub const fn full(frame: &FrameBuffer) -> Self {
        Self::new(0, 0, frame.width, frame.height)
    }

    /// Parse `"x,y,w,h"`.
    ///
    /// # Errors
    /// Returns [`CoreError::Config`] if the string does not hold four integers.
    ///
    /// # Example
    /// ```
    /// use eh_core::frame::Region;
    /// assert_eq!(Region::parse("1, 2,3,4").unwrap(), Region::new(1, 2, 3, 4));
    /// assert!(Region::parse("1,2,3").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let parts: Vec<u32> = s
            .split(',')
            .map(|p| p.trim().parse::<u32>())
            .collect::<Result<_, _>>()
            .map_err(|e| CoreError::Config(format!("sélection '{s}' : {e}")))?;
        match parts.as_slice() {
            &[x, y, width, height] => Ok(Self::new(x, y, width, height)),
            _ => Err(CoreError::Config(format!(
                "sélection '{s}' : attendu x,y,largeur,hauteur"
            ))),
        }
    }

    /// Vérifie que la sélection tient dans l'image.
    ///
    /// # Errors
    /// Returns [`CoreError::RegionOutOfBounds`] otherwise.
    pub fn validate(&self, frame: &FrameBuffer) -> Result<(), CoreError> {
        let fits_x = u64::from(self.x) + u64::from(self.width) <= u64::from(frame.width);
        let fits_y = u64::from(self.y) + u64::from(self.height) <= u64::from(frame.height);
        if fits_x && fits_y {
            Ok(())
        } else {
            Err(CoreError::RegionOutOfBounds {
                x: self.x,
                y: self.y,
                width: self.width,
                height: self.height,
                frame_width: frame.width,
                frame_height: frame.height,
            })
        }
    }

    #[must_use]
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Lignes de la sélection, de haut en bas.
    pub fn rows(&self) -> std::ops::Range<u32> {
        self.y..self.y + self.height
    }

    /// Colonnes de la sélection, de gauche à droite.
    pub fn columns(&self) -> std::ops::Range<u32> {
        self.x..self.x + self.width
    }
}
