// Copyright 2020 @TwoCookingMice

use std::ops;
use std::vec::Vec;

/// A dense 2D grid indexed by `(x, y)`, stored row by row.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap<T> {
    data: Vec<T>,
    height: usize,
    width: usize
}

impl<T> ops::Index<(usize, usize)> for Bitmap<T> {
    type Output = T;

    fn index(&self, index: (usize, usize)) -> &T {
        assert!(index.0 < self.width && index.1 < self.height);
        &self.data[index.0 + self.width * index.1]
    }
}

impl<T> ops::IndexMut<(usize, usize)> for Bitmap<T> {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut T {
        assert!(index.0 < self.width && index.1 < self.height);
        &mut self.data[index.0 + self.width * index.1]
    }
}

impl<T: Clone> Bitmap<T> {
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self { data: vec![value; width * height],
               width: width,
               height: height }
    }
}

impl<T: Clone + Default> Bitmap<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, T::default())
    }
}

impl<T> Bitmap<T> {
    pub fn from_fn<F: FnMut(usize, usize) -> T>(width: usize, height: usize, mut f: F) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self { data, width, height }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x < self.width && y < self.height {
            self.data.get(x + self.width * y)
        } else {
            None
        }
    }
}

/* Test for Bitmap */
